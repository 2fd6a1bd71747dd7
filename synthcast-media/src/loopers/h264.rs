//! H.264 Annex-B looper

use super::{read_stream, LooperMetadata, MediaSample, SampleLoop, VideoLooper};
use crate::codecs::{Codec, CodecInfo};
use bytes::Bytes;
use std::io::Read;
use std::time::Duration;
use synthcast_core::{SynthcastError, SynthcastResult};
use tracing::debug;

const CODEC_NAME: &str = "H.264";

/// Non-IDR coded slice
pub const NAL_SLICE: u8 = 1;
/// IDR coded slice
pub const NAL_IDR_SLICE: u8 = 5;
/// Sequence parameter set
pub const NAL_SPS: u8 = 7;
/// Picture parameter set
pub const NAL_PPS: u8 = 8;

/// NAL unit type of a unit payload
pub fn nal_type(nal: &[u8]) -> u8 {
    nal.first().map(|header| header & 0x1F).unwrap_or(0)
}

/// Whether a NAL unit carries picture data
pub fn is_vcl(nal: &[u8]) -> bool {
    matches!(nal_type(nal), NAL_SLICE | NAL_IDR_SLICE)
}

/// Split an Annex-B byte stream into NAL unit payloads
///
/// Accepts both 3 and 4 byte start codes and strips trailing zero bytes.
pub fn split_annex_b(data: &Bytes) -> Vec<Bytes> {
    // (start code offset, payload offset)
    let mut markers = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            let code_start = if i > 0 && data[i - 1] == 0 { i - 1 } else { i };
            markers.push((code_start, i + 3));
            i += 3;
        } else {
            i += 1;
        }
    }

    let mut units = Vec::with_capacity(markers.len());
    for (index, &(_, payload_start)) in markers.iter().enumerate() {
        let mut end = markers
            .get(index + 1)
            .map(|&(code_start, _)| code_start)
            .unwrap_or(data.len());
        while end > payload_start && data[end - 1] == 0 {
            end -= 1;
        }
        if end > payload_start {
            units.push(data.slice(payload_start..end));
        }
    }
    units
}

/// Replays an H.264 elementary stream one NAL unit at a time
///
/// Coded slices advance the clock by one frame; parameter sets and other
/// non-VCL units carry zero duration.
#[derive(Debug)]
pub struct H264Looper {
    metadata: LooperMetadata,
    track_id: String,
    samples: SampleLoop,
}

impl H264Looper {
    /// Parse an Annex-B stream into a looper
    pub fn new(stream: &mut dyn Read, metadata: LooperMetadata) -> SynthcastResult<Self> {
        metadata.validate(CODEC_NAME)?;
        let data = read_stream(stream)?;
        let units = split_annex_b(&data);
        if units.is_empty() {
            return Err(SynthcastError::looper(CODEC_NAME, "no NAL units found"));
        }
        if units.iter().any(|nal| nal[0] & 0x80 != 0) {
            return Err(SynthcastError::looper(
                CODEC_NAME,
                "forbidden_zero_bit set in NAL header",
            ));
        }

        let frame_duration = metadata.frame_duration();
        let frames = units.iter().filter(|nal| is_vcl(nal)).count();
        if frames == 0 {
            return Err(SynthcastError::looper(
                CODEC_NAME,
                "stream contains no coded slices",
            ));
        }

        let samples = units
            .into_iter()
            .map(|nal| {
                let duration = if is_vcl(&nal) {
                    frame_duration
                } else {
                    Duration::ZERO
                };
                MediaSample {
                    data: nal,
                    duration,
                }
            })
            .collect();
        let samples = SampleLoop::new(samples, CODEC_NAME)?;

        debug!(
            nal_units = samples.len(),
            frames,
            width = metadata.width,
            height = metadata.height,
            "Built H.264 looper"
        );

        Ok(Self {
            metadata,
            track_id: uuid::Uuid::new_v4().to_string(),
            samples,
        })
    }
}

impl VideoLooper for H264Looper {
    fn codec_info(&self) -> CodecInfo {
        Codec::H264.info()
    }

    fn metadata(&self) -> &LooperMetadata {
        &self.metadata
    }

    fn track_id(&self) -> &str {
        &self.track_id
    }

    fn next_sample(&mut self) -> MediaSample {
        self.samples.next()
    }

    fn loop_count(&self) -> u64 {
        self.samples.loops()
    }
}
