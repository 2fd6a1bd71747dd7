//! Provider configuration

use serde::{Deserialize, Serialize};
use synthcast_core::{SynthcastError, SynthcastResult};
use synthcast_media::{Codec, ResolutionTier};

/// Defaults applied to requests made through a [`crate::Provider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Tier name or comma-separated rung list
    pub resolution: String,
    /// Codec identifier, or empty for any codec
    pub codec_filter: String,
    /// Realize every resolved layer instead of only the highest
    pub simulcast: bool,
    /// Install a debug-level subscriber when the provider is built
    pub debug_logging: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            resolution: "high".to_string(),
            codec_filter: String::new(),
            simulcast: true,
            debug_logging: false,
        }
    }
}

impl ProviderConfig {
    /// Parse a configuration from JSON, filling absent fields with defaults
    pub fn from_json(json: &str) -> SynthcastResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SynthcastError::InvalidConfiguration {
                message: format!("Failed to parse provider config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject codec filters that no catalog theme could ever match
    pub fn validate(&self) -> SynthcastResult<()> {
        if !self.codec_filter.trim().is_empty() {
            self.codec_filter.trim().parse::<Codec>()?;
        }
        Ok(())
    }

    /// Parsed resolution tier
    pub fn tier(&self) -> ResolutionTier {
        ResolutionTier::parse(&self.resolution)
    }
}
