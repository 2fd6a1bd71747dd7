//! Looper factory
//!
//! Ties theme rotation, tier resolution and resource naming together and
//! realizes every requested layer as a looper, or fails as a whole.

use crate::catalog::{AudioCatalog, SpecCatalog, VideoLayer, VideoLayerSpec, VideoQuality};
use crate::codecs::Codec;
use crate::loopers::{
    AudioLooper, ContainerLoopers, LooperConstructors, LooperMetadata, VideoLooper,
};
use crate::naming;
use crate::rotator::{AudioRotator, ThemeRotator};
use crate::tiers::{collapse_to_highest, resolve_layers, ResolutionTier};
use std::sync::Arc;
use synthcast_core::{ResourceStore, SynthcastResult};
use tracing::{debug, info};

/// Builds loopers for simulated publishers
#[derive(Debug, Clone)]
pub struct LooperFactory {
    store: Arc<dyn ResourceStore>,
    themes: ThemeRotator,
    audio: AudioRotator,
    constructors: Arc<dyn LooperConstructors>,
}

impl LooperFactory {
    /// Factory over the built-in catalogs with the default constructors
    pub fn new(store: Arc<dyn ResourceStore>) -> SynthcastResult<Self> {
        Ok(Self::with_parts(
            store,
            ThemeRotator::new(Arc::new(SpecCatalog::builtin()?)),
            AudioRotator::new(Arc::new(AudioCatalog::builtin()?)),
            Arc::new(ContainerLoopers),
        ))
    }

    /// Factory from explicit collaborators
    pub fn with_parts(
        store: Arc<dyn ResourceStore>,
        themes: ThemeRotator,
        audio: AudioRotator,
        constructors: Arc<dyn LooperConstructors>,
    ) -> Self {
        Self {
            store,
            themes,
            audio,
            constructors,
        }
    }

    /// Replace the spec catalog, keeping the current rotation counter
    pub fn with_catalog(mut self, catalog: SpecCatalog) -> Self {
        self.themes = ThemeRotator::with_counter(Arc::new(catalog), self.themes.counter().clone());
        self
    }

    /// Replace the looper constructors
    pub fn with_constructors(mut self, constructors: Arc<dyn LooperConstructors>) -> Self {
        self.constructors = constructors;
        self
    }

    /// Layers a request would realize, without opening any resource
    pub fn plan_video_layers(
        &self,
        resolution: &str,
        codec_filter: &str,
        simulcast: bool,
    ) -> SynthcastResult<Vec<VideoLayerSpec>> {
        let tier = ResolutionTier::parse(resolution);
        let theme = self.themes.pick_theme(codec_filter)?;
        if tier.is_custom() {
            info!(theme = theme.name(), resolution, "Creating custom resolution loopers");
        } else {
            info!(theme = theme.name(), tier = %tier, "Creating resolution loopers");
        }

        let mut layers = resolve_layers(&tier, &theme);
        if simulcast {
            let dims: Vec<String> = layers.iter().map(VideoLayerSpec::dimensions).collect();
            info!(
                layers = layers.len(),
                dimensions = %dims.join(", "),
                "Simulcast mode"
            );
        } else {
            layers = collapse_to_highest(layers);
            if let Some(layer) = layers.first() {
                info!(dimensions = %layer.dimensions(), "Non-simulcast mode, single layer");
            }
        }
        Ok(layers)
    }

    /// Layer descriptions a publisher announces for a request
    ///
    /// Simulcast layers are tagged in ascending order starting at
    /// [`VideoQuality::Low`]; a single non-simulcast layer is `High`.
    pub fn plan_announced_layers(
        &self,
        resolution: &str,
        codec_filter: &str,
        simulcast: bool,
    ) -> SynthcastResult<Vec<VideoLayer>> {
        let layers = self.plan_video_layers(resolution, codec_filter, simulcast)?;
        Ok(announce(&layers, simulcast))
    }

    /// Create one looper per requested layer
    ///
    /// `resolution` is a tier name or a comma-separated rung list and
    /// `codec_filter` an empty string or a codec identifier. Any failure
    /// aborts the request; no partial list is returned.
    pub fn create_video_loopers(
        &self,
        resolution: &str,
        codec_filter: &str,
        simulcast: bool,
    ) -> SynthcastResult<Vec<Box<dyn VideoLooper>>> {
        let layers = self.plan_video_layers(resolution, codec_filter, simulcast)?;
        layers
            .iter()
            .map(|layer| self.create_layer_looper(layer))
            .collect()
    }

    /// Create a looper for a single layer
    pub fn create_layer_looper(
        &self,
        layer: &VideoLayerSpec,
    ) -> SynthcastResult<Box<dyn VideoLooper>> {
        let path = naming::resource_name(layer, self.store.as_ref());
        let mut handle = self.store.open(&path)?;
        let metadata = LooperMetadata::from(layer);
        debug!(
            path = %path,
            codec = %layer.codec,
            dimensions = %layer.dimensions(),
            bitrate_bps = metadata.bitrate_bps,
            "Opening video looper"
        );

        // handle is dropped on every exit from this scope
        match layer.codec {
            Codec::H264 => self.constructors.h264(&mut handle, metadata),
            Codec::VP8 => self.constructors.vp8(&mut handle, metadata),
        }
    }

    /// Create a looper for the next audio sample
    pub fn create_audio_looper(&self) -> SynthcastResult<Box<dyn AudioLooper>> {
        let sample = self.audio.pick_sample()?;
        let path = AudioCatalog::resource_name(&sample);
        let mut handle = self.store.open(&path)?;
        debug!(path = %path, "Opening audio looper");
        self.constructors.opus(&mut handle)
    }

    /// Theme rotator in use
    pub fn theme_rotator(&self) -> &ThemeRotator {
        &self.themes
    }

    /// Audio rotator in use
    pub fn audio_rotator(&self) -> &AudioRotator {
        &self.audio
    }

    /// Store assets are read from
    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }
}

/// Tag resolved layers with the simulcast quality they are announced as
pub fn announce(layers: &[VideoLayerSpec], simulcast: bool) -> Vec<VideoLayer> {
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let quality = if simulcast {
                VideoQuality::from_index(index)
            } else {
                VideoQuality::High
            };
            layer.to_video_layer(quality)
        })
        .collect()
}
