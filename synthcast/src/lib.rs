//! # synthcast - Synthetic Media Publishers
//!
//! synthcast supplies pre-encoded media for simulated publishers when
//! load-testing an SFU. Each request picks a bundled visual theme, narrows it
//! to the requested quality layers, and returns loopers that replay the
//! matching assets indefinitely.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use synthcast::{MemoryStore, Provider};
//!
//! # fn main() -> Result<(), synthcast::SynthcastError> {
//! let store = Arc::new(MemoryStore::new());
//! let provider = Provider::new(store)?;
//!
//! // Three simulcast layers of whichever VP8 theme is next in rotation
//! let mut layers = provider.create_video_loopers("high", "vp8", true)?;
//! let audio = provider.create_audio_looper()?;
//!
//! for layer in layers.iter_mut() {
//!     let sample = layer.next_sample();
//!     println!("{} bytes for {}", sample.data.len(), layer.track_id());
//! }
//! # drop(audio);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use synthcast_core::{
    ErrorCategory, MemoryStore, ResourceHandle, ResourceStore, RotationCounter, StoreMetrics,
    SynthcastError, SynthcastResult,
};

pub use synthcast_media::{
    canonical_name, AudioCatalog, AudioLooper, Codec, CodecInfo, LooperConstructors,
    LooperFactory, LooperMetadata, MediaSample, ResolutionTier, Rung, SpecCatalog, Theme,
    VideoLayer, VideoLayerSpec, VideoLooper, VideoQuality,
};

// Public API modules
pub mod config;
pub mod logging;

pub use config::ProviderConfig;
pub use logging::init_logging;

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::info;

/// Loopers backing one simulated publisher
#[derive(Debug)]
pub struct PublisherLoopers {
    /// One looper per published video layer
    pub video: Vec<Box<dyn VideoLooper>>,
    /// Audio looper
    pub audio: Box<dyn AudioLooper>,
}

/// Main entry point for synthcast
#[derive(Debug, Clone)]
pub struct Provider {
    factory: LooperFactory,
    config: ProviderConfig,
}

impl Provider {
    /// Provider over the built-in catalogs with default configuration
    pub fn new(store: Arc<dyn ResourceStore>) -> SynthcastResult<Self> {
        Self::from_config(store, ProviderConfig::default())
    }

    /// Provider with a validated configuration
    ///
    /// When `debug_logging` is set this installs the debug-level subscriber
    /// through [`init_logging`], unless one is already installed.
    pub fn from_config(
        store: Arc<dyn ResourceStore>,
        config: ProviderConfig,
    ) -> SynthcastResult<Self> {
        Self::with_factory(LooperFactory::new(store)?, config)
    }

    /// Provider around a preassembled factory
    pub fn with_factory(factory: LooperFactory, config: ProviderConfig) -> SynthcastResult<Self> {
        config.validate()?;
        if config.debug_logging {
            init_logging(true);
        }
        Ok(Self { factory, config })
    }

    /// Configuration this provider was built with
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Underlying looper factory
    pub fn factory(&self) -> &LooperFactory {
        &self.factory
    }

    /// Create one video looper per requested layer
    pub fn create_video_loopers(
        &self,
        resolution: &str,
        codec_filter: &str,
        simulcast: bool,
    ) -> SynthcastResult<Vec<Box<dyn VideoLooper>>> {
        self.factory
            .create_video_loopers(resolution, codec_filter, simulcast)
    }

    /// Create video loopers using the configured defaults
    pub fn create_configured_video_loopers(&self) -> SynthcastResult<Vec<Box<dyn VideoLooper>>> {
        self.create_video_loopers(
            &self.config.resolution,
            &self.config.codec_filter,
            self.config.simulcast,
        )
    }

    /// Create a looper for the next audio sample
    pub fn create_audio_looper(&self) -> SynthcastResult<Box<dyn AudioLooper>> {
        self.factory.create_audio_looper()
    }

    /// Create video and audio loopers for one publisher using the configured defaults
    pub fn create_publisher(&self) -> SynthcastResult<PublisherLoopers> {
        Ok(PublisherLoopers {
            video: self.create_configured_video_loopers()?,
            audio: self.create_audio_looper()?,
        })
    }

    /// Create video loopers on the blocking thread pool
    pub async fn create_video_loopers_async(
        &self,
        resolution: &str,
        codec_filter: &str,
        simulcast: bool,
    ) -> SynthcastResult<Vec<Box<dyn VideoLooper>>> {
        let factory = self.factory.clone();
        let resolution = resolution.to_string();
        let codec_filter = codec_filter.to_string();
        tokio::task::spawn_blocking(move || {
            factory.create_video_loopers(&resolution, &codec_filter, simulcast)
        })
        .await
        .map_err(|e| SynthcastError::looper("video", format!("Looper task failed: {}", e)))?
    }

    /// Create an audio looper on the blocking thread pool
    pub async fn create_audio_looper_async(&self) -> SynthcastResult<Box<dyn AudioLooper>> {
        let factory = self.factory.clone();
        tokio::task::spawn_blocking(move || factory.create_audio_looper())
            .await
            .map_err(|e| SynthcastError::looper("audio", format!("Looper task failed: {}", e)))?
    }

    /// Create loopers for `count` publishers concurrently
    ///
    /// Fails as a whole if any publisher cannot be realized.
    pub async fn create_publishers(&self, count: usize) -> SynthcastResult<Vec<PublisherLoopers>> {
        info!(count, resolution = %self.config.resolution, "Creating publishers");
        let tasks = (0..count).map(|_| {
            let provider = self.clone();
            async move {
                tokio::task::spawn_blocking(move || provider.create_publisher())
                    .await
                    .map_err(|e| {
                        SynthcastError::looper("publisher", format!("Looper task failed: {}", e))
                    })?
            }
        });
        try_join_all(tasks).await
    }
}
