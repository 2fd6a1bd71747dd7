//! # synthcast Media
//!
//! Spec catalog, resolution tiers, theme rotation and media loopers.
//! Given a tier and a codec filter, this crate picks a bundled theme,
//! narrows it to the requested quality layers, and turns each layer's
//! asset into a looper that replays it indefinitely.

#![warn(clippy::all)]

pub mod catalog;
pub mod codecs;
pub mod factory;
pub mod loopers;
pub mod naming;
pub mod rotator;
pub mod tiers;

// Re-export main types
pub use catalog::{
    AudioCatalog, Rung, SpecCatalog, Theme, VideoLayer, VideoLayerSpec, VideoQuality,
};
pub use codecs::{Codec, CodecInfo};
pub use factory::{announce, LooperFactory};
pub use loopers::{
    AudioLooper, ContainerLoopers, H264Looper, LooperConstructors, LooperMetadata, MediaSample,
    OpusLooper, VideoLooper, Vp8Looper,
};
pub use naming::{canonical_name, fallback_bitrate_kbps, resource_name};
pub use rotator::{AudioRotator, ThemeRotator};
pub use tiers::{collapse_to_highest, resolve_layers, ResolutionTier};
