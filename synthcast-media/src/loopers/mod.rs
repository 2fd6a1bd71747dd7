//! Media loopers
//!
//! A looper replays a bundled media resource indefinitely so it can be
//! published as a live track. Loopers are built through the
//! [`LooperConstructors`] seam; [`ContainerLoopers`] is the default, which
//! splits the bundled containers into samples once and then cycles them.

pub mod h264;
pub mod opus;
pub mod vp8;

use crate::catalog::VideoLayerSpec;
use crate::codecs::CodecInfo;
use bytes::Bytes;
use std::io::Read;
use std::time::Duration;
use synthcast_core::{SynthcastError, SynthcastResult};

pub use h264::H264Looper;
pub use opus::OpusLooper;
pub use vp8::Vp8Looper;

/// Encoding parameters handed to a video looper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooperMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bitrate in bits per second
    pub bitrate_bps: u32,
    /// Frames per second
    pub frame_rate: u32,
}

impl LooperMetadata {
    /// Reject parameters a looper cannot pace samples with
    pub fn validate(&self, codec: &str) -> SynthcastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SynthcastError::looper(
                codec,
                format!("invalid dimensions {}x{}", self.width, self.height),
            ));
        }
        if self.frame_rate == 0 {
            return Err(SynthcastError::looper(codec, "frame rate must be positive"));
        }
        Ok(())
    }

    /// Duration of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl From<&VideoLayerSpec> for LooperMetadata {
    fn from(layer: &VideoLayerSpec) -> Self {
        Self {
            width: layer.width,
            height: layer.height,
            bitrate_bps: layer.bitrate_bps(),
            frame_rate: layer.frame_rate,
        }
    }
}

/// One unit of looped media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSample {
    /// Encoded payload
    pub data: Bytes,
    /// Presentation duration of the payload
    pub duration: Duration,
}

/// Looper replaying a video resource
pub trait VideoLooper: Send + std::fmt::Debug {
    /// Codec the looper publishes
    fn codec_info(&self) -> CodecInfo;

    /// Encoding parameters of the layer
    fn metadata(&self) -> &LooperMetadata;

    /// Identifier of the simulated track
    fn track_id(&self) -> &str;

    /// Next sample, wrapping to the start at end of stream
    fn next_sample(&mut self) -> MediaSample;

    /// Completed passes over the resource
    fn loop_count(&self) -> u64;
}

/// Looper replaying an audio resource
pub trait AudioLooper: Send + std::fmt::Debug {
    /// Codec the looper publishes
    fn codec_info(&self) -> CodecInfo;

    /// Identifier of the simulated track
    fn track_id(&self) -> &str;

    /// Next sample, wrapping to the start at end of stream
    fn next_sample(&mut self) -> MediaSample;

    /// Completed passes over the resource
    fn loop_count(&self) -> u64;
}

/// Codec-specific looper constructors
pub trait LooperConstructors: Send + Sync + std::fmt::Debug {
    /// Build an H.264 looper from an Annex-B stream
    fn h264(
        &self,
        stream: &mut dyn Read,
        metadata: LooperMetadata,
    ) -> SynthcastResult<Box<dyn VideoLooper>>;

    /// Build a VP8 looper from an IVF stream
    fn vp8(
        &self,
        stream: &mut dyn Read,
        metadata: LooperMetadata,
    ) -> SynthcastResult<Box<dyn VideoLooper>>;

    /// Build an Opus looper from an Ogg stream
    fn opus(&self, stream: &mut dyn Read) -> SynthcastResult<Box<dyn AudioLooper>>;
}

/// Default constructors parsing the bundled container formats
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerLoopers;

impl LooperConstructors for ContainerLoopers {
    fn h264(
        &self,
        stream: &mut dyn Read,
        metadata: LooperMetadata,
    ) -> SynthcastResult<Box<dyn VideoLooper>> {
        Ok(Box::new(H264Looper::new(stream, metadata)?))
    }

    fn vp8(
        &self,
        stream: &mut dyn Read,
        metadata: LooperMetadata,
    ) -> SynthcastResult<Box<dyn VideoLooper>> {
        Ok(Box::new(Vp8Looper::new(stream, metadata)?))
    }

    fn opus(&self, stream: &mut dyn Read) -> SynthcastResult<Box<dyn AudioLooper>> {
        Ok(Box::new(OpusLooper::new(stream)?))
    }
}

/// Read a whole stream into a shared buffer
pub(crate) fn read_stream(stream: &mut dyn Read) -> SynthcastResult<Bytes> {
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    Ok(Bytes::from(data))
}

/// Cyclic cursor over parsed samples
#[derive(Debug, Clone)]
pub(crate) struct SampleLoop {
    samples: Vec<MediaSample>,
    position: usize,
    loops: u64,
}

impl SampleLoop {
    /// Wrap a non-empty sample list
    pub(crate) fn new(samples: Vec<MediaSample>, codec: &str) -> SynthcastResult<Self> {
        if samples.is_empty() {
            return Err(SynthcastError::looper(codec, "stream contains no media samples"));
        }
        Ok(Self {
            samples,
            position: 0,
            loops: 0,
        })
    }

    pub(crate) fn next(&mut self) -> MediaSample {
        let sample = self.samples[self.position].clone();
        self.position += 1;
        if self.position == self.samples.len() {
            self.position = 0;
            self.loops += 1;
        }
        sample
    }

    pub(crate) fn loops(&self) -> u64 {
        self.loops
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }
}
