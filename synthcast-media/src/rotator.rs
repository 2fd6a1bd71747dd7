//! Fair round-robin selection of themes and audio samples

use crate::catalog::{AudioCatalog, SpecCatalog, Theme};
use std::sync::Arc;
use synthcast_core::{RotationCounter, SynthcastError, SynthcastResult};
use tracing::debug;

/// Round-robin chooser over catalog themes filtered by codec
#[derive(Debug, Clone)]
pub struct ThemeRotator {
    catalog: Arc<SpecCatalog>,
    counter: Arc<RotationCounter>,
}

impl ThemeRotator {
    /// Create a rotator with its own counter
    pub fn new(catalog: Arc<SpecCatalog>) -> Self {
        Self::with_counter(catalog, Arc::new(RotationCounter::new()))
    }

    /// Create a rotator sharing an existing counter
    pub fn with_counter(catalog: Arc<SpecCatalog>, counter: Arc<RotationCounter>) -> Self {
        Self { catalog, counter }
    }

    /// Pick the next theme whose codec matches the filter
    pub fn pick_theme(&self, codec_filter: &str) -> SynthcastResult<Arc<Theme>> {
        let filtered = self.catalog.filtered(codec_filter);
        let index =
            self.counter
                .next_index(filtered.len())
                .ok_or_else(|| SynthcastError::NoMatchingTheme {
                    filter: codec_filter.to_string(),
                })?;

        let theme = filtered[index].clone();
        debug!(
            theme = theme.name(),
            codec = %theme.codec(),
            candidates = filtered.len(),
            "Picked video theme"
        );
        Ok(theme)
    }

    /// Catalog being rotated over
    pub fn catalog(&self) -> &Arc<SpecCatalog> {
        &self.catalog
    }

    /// Counter driving the rotation
    pub fn counter(&self) -> &Arc<RotationCounter> {
        &self.counter
    }
}

/// Round-robin chooser over audio samples
#[derive(Debug, Clone)]
pub struct AudioRotator {
    catalog: Arc<AudioCatalog>,
    counter: Arc<RotationCounter>,
}

impl AudioRotator {
    /// Create a rotator with its own counter
    pub fn new(catalog: Arc<AudioCatalog>) -> Self {
        Self::with_counter(catalog, Arc::new(RotationCounter::new()))
    }

    /// Create a rotator sharing an existing counter
    pub fn with_counter(catalog: Arc<AudioCatalog>, counter: Arc<RotationCounter>) -> Self {
        Self { catalog, counter }
    }

    /// Pick the next audio sample name
    pub fn pick_sample(&self) -> SynthcastResult<String> {
        let samples = self.catalog.samples();
        let index =
            self.counter
                .next_index(samples.len())
                .ok_or_else(|| SynthcastError::InvalidCatalog {
                    reason: "audio catalog is empty".to_string(),
                })?;

        debug!(sample = %samples[index], "Picked audio sample");
        Ok(samples[index].clone())
    }

    /// Counter driving the rotation
    pub fn counter(&self) -> &Arc<RotationCounter> {
        &self.counter
    }
}
