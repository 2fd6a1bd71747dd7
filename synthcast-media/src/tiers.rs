//! Resolution tiers and the layer resolver
//!
//! A tier names a bundle of rungs (`low`, `medium`, `high`, `very-high`) or
//! carries a custom comma-separated rung list such as `"360,720,1080"`.
//! [`resolve_layers`] narrows a theme's layers to the requested set.

use crate::catalog::{Rung, Theme, VideoLayerSpec};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Requested set of quality layers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolutionTier {
    /// 180p
    Low,
    /// 180p + 360p
    Medium,
    /// 180p + 360p + 720p
    #[default]
    High,
    /// 360p + 720p + 1080p
    VeryHigh,
    /// Caller supplied labels, in order, unparsed
    Custom(Vec<String>),
}

impl ResolutionTier {
    /// Parse a tier name or a comma-separated rung list
    ///
    /// Unrecognized tier names map to [`ResolutionTier::High`].
    pub fn parse(resolution: &str) -> Self {
        if resolution.contains(',') {
            return ResolutionTier::Custom(
                resolution
                    .split(',')
                    .map(|label| label.trim().to_string())
                    .collect(),
            );
        }

        match resolution.trim().to_ascii_lowercase().as_str() {
            "low" => ResolutionTier::Low,
            "medium" => ResolutionTier::Medium,
            "high" => ResolutionTier::High,
            "very-high" => ResolutionTier::VeryHigh,
            other => {
                debug!(resolution = other, "Unrecognized tier, using high");
                ResolutionTier::High
            }
        }
    }

    /// Rungs a named tier selects; `None` for custom tiers
    pub fn rungs(&self) -> Option<&'static [Rung]> {
        match self {
            ResolutionTier::Low => Some(&[Rung::R180]),
            ResolutionTier::Medium => Some(&[Rung::R180, Rung::R360]),
            ResolutionTier::High => Some(&[Rung::R180, Rung::R360, Rung::R720]),
            ResolutionTier::VeryHigh => Some(&[Rung::R360, Rung::R720, Rung::R1080]),
            ResolutionTier::Custom(_) => None,
        }
    }

    /// Whether this is a caller supplied rung list
    pub fn is_custom(&self) -> bool {
        matches!(self, ResolutionTier::Custom(_))
    }
}

impl FromStr for ResolutionTier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionTier::Low => f.write_str("low"),
            ResolutionTier::Medium => f.write_str("medium"),
            ResolutionTier::High => f.write_str("high"),
            ResolutionTier::VeryHigh => f.write_str("very-high"),
            ResolutionTier::Custom(labels) => f.write_str(&labels.join(",")),
        }
    }
}

/// Narrow a theme's layers to those a tier requests
///
/// Named tiers return layers in ascending quality and omit rungs the theme
/// lacks, except 1080p, which is synthesized from the theme's 720p layer
/// when it has one. Custom tiers keep the caller's order, duplicates included, and fall
/// back to `high` when no label resolves. The result is non-empty whenever
/// the theme is.
pub fn resolve_layers(tier: &ResolutionTier, theme: &Theme) -> Vec<VideoLayerSpec> {
    let layers = match tier {
        ResolutionTier::Custom(labels) => {
            let layers = resolve_custom(labels, theme);
            if layers.is_empty() {
                debug!(
                    theme = theme.name(),
                    labels = %labels.join(","),
                    "No custom labels resolved, using high"
                );
                resolve_named(&ResolutionTier::High, theme)
            } else {
                layers
            }
        }
        named => resolve_named(named, theme),
    };

    if layers.is_empty() {
        // only reachable when the theme lacks every rung the tier names
        return theme.layers().last().cloned().into_iter().collect();
    }
    layers
}

/// Keep only the highest-quality layer of a resolved set
pub fn collapse_to_highest(layers: Vec<VideoLayerSpec>) -> Vec<VideoLayerSpec> {
    layers
        .into_iter()
        .max_by_key(|layer| (layer.rung, layer.height, layer.bitrate_kbps))
        .into_iter()
        .collect()
}

fn resolve_named(tier: &ResolutionTier, theme: &Theme) -> Vec<VideoLayerSpec> {
    tier.rungs()
        .unwrap_or_default()
        .iter()
        .filter_map(|&rung| layer_for(rung, theme))
        .collect()
}

fn resolve_custom(labels: &[String], theme: &Theme) -> Vec<VideoLayerSpec> {
    labels
        .iter()
        .filter_map(|label| match label.parse::<Rung>() {
            Ok(rung) => layer_for(rung, theme),
            Err(_) => {
                debug!(label = %label, "Skipping unknown resolution label");
                None
            }
        })
        .collect()
}

fn layer_for(rung: Rung, theme: &Theme) -> Option<VideoLayerSpec> {
    if let Some(layer) = theme.layer(rung) {
        return Some(layer.clone());
    }
    if rung != Rung::R1080 {
        return None;
    }

    // 1080p is only derived from a 720p rung; sparser themes drop it
    let base = theme.layer(Rung::R720)?;
    debug!(
        theme = theme.name(),
        base = %base.dimensions(),
        "Synthesizing 1080p layer"
    );
    Some(VideoLayerSpec::synthesized_hd(base))
}
