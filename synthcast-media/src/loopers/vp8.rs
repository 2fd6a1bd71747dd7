//! VP8 IVF looper

use super::{read_stream, LooperMetadata, MediaSample, SampleLoop, VideoLooper};
use crate::codecs::{Codec, CodecInfo};
use bytes::{Buf, Bytes};
use std::io::Read;
use synthcast_core::{SynthcastError, SynthcastResult};
use tracing::debug;

const CODEC_NAME: &str = "VP8";

/// IVF file signature
pub const IVF_SIGNATURE: &[u8; 4] = b"DKIF";
/// FourCC of VP8 payloads
pub const VP8_FOURCC: &[u8; 4] = b"VP80";
/// Size of the IVF file header
pub const IVF_HEADER_LEN: usize = 32;
/// Size of each IVF frame header
pub const IVF_FRAME_HEADER_LEN: usize = 12;

/// Parsed IVF file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IvfHeader {
    /// Coded width
    pub width: u16,
    /// Coded height
    pub height: u16,
    /// Timebase denominator
    pub timebase_den: u32,
    /// Timebase numerator
    pub timebase_num: u32,
    /// Frame count declared by the header
    pub frame_count: u32,
    /// Header length, offset of the first frame
    pub header_len: usize,
}

/// Parse and validate an IVF header carrying VP8
pub fn parse_ivf_header(data: &[u8]) -> SynthcastResult<IvfHeader> {
    if data.len() < IVF_HEADER_LEN {
        return Err(SynthcastError::looper(CODEC_NAME, "IVF header truncated"));
    }
    if &data[0..4] != IVF_SIGNATURE {
        return Err(SynthcastError::looper(CODEC_NAME, "missing DKIF signature"));
    }

    let mut buf = &data[4..IVF_HEADER_LEN];
    let _version = buf.get_u16_le();
    let header_len = buf.get_u16_le() as usize;
    let mut fourcc = [0u8; 4];
    buf.copy_to_slice(&mut fourcc);
    if &fourcc != VP8_FOURCC {
        return Err(SynthcastError::looper(
            CODEC_NAME,
            format!("unexpected fourcc {}", String::from_utf8_lossy(&fourcc)),
        ));
    }

    let header = IvfHeader {
        width: buf.get_u16_le(),
        height: buf.get_u16_le(),
        timebase_den: buf.get_u32_le(),
        timebase_num: buf.get_u32_le(),
        frame_count: buf.get_u32_le(),
        header_len,
    };
    if header.header_len < IVF_HEADER_LEN || header.header_len > data.len() {
        return Err(SynthcastError::looper(
            CODEC_NAME,
            format!("invalid IVF header length {}", header.header_len),
        ));
    }
    Ok(header)
}

/// Split the frames following an IVF header
pub fn split_ivf_frames(data: &Bytes, header: &IvfHeader) -> SynthcastResult<Vec<Bytes>> {
    let mut frames = Vec::new();
    let mut offset = header.header_len;
    while offset < data.len() {
        if data.len() - offset < IVF_FRAME_HEADER_LEN {
            return Err(SynthcastError::looper(CODEC_NAME, "IVF frame header truncated"));
        }
        let mut frame_header = &data[offset..offset + IVF_FRAME_HEADER_LEN];
        let size = frame_header.get_u32_le() as usize;
        let _pts = frame_header.get_u64_le();

        let start = offset + IVF_FRAME_HEADER_LEN;
        let end = start
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                SynthcastError::looper(
                    CODEC_NAME,
                    format!("IVF frame at offset {} overruns the stream", offset),
                )
            })?;
        frames.push(data.slice(start..end));
        offset = end;
    }
    Ok(frames)
}

/// Replays an IVF file one frame at a time
#[derive(Debug)]
pub struct Vp8Looper {
    metadata: LooperMetadata,
    header: IvfHeader,
    track_id: String,
    samples: SampleLoop,
}

impl Vp8Looper {
    /// Parse an IVF stream into a looper
    pub fn new(stream: &mut dyn Read, metadata: LooperMetadata) -> SynthcastResult<Self> {
        metadata.validate(CODEC_NAME)?;
        let data = read_stream(stream)?;
        let header = parse_ivf_header(&data)?;
        let frame_duration = metadata.frame_duration();
        let samples = split_ivf_frames(&data, &header)?
            .into_iter()
            .map(|frame| MediaSample {
                data: frame,
                duration: frame_duration,
            })
            .collect();
        let samples = SampleLoop::new(samples, CODEC_NAME)?;

        debug!(
            frames = samples.len(),
            coded_width = header.width,
            coded_height = header.height,
            width = metadata.width,
            height = metadata.height,
            "Built VP8 looper"
        );

        Ok(Self {
            metadata,
            header,
            track_id: uuid::Uuid::new_v4().to_string(),
            samples,
        })
    }

    /// Header of the replayed IVF file
    pub fn header(&self) -> &IvfHeader {
        &self.header
    }
}

impl VideoLooper for Vp8Looper {
    fn codec_info(&self) -> CodecInfo {
        Codec::VP8.info()
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn ivf(frames: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(IVF_SIGNATURE);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&32u16.to_le_bytes());
        data.extend_from_slice(VP8_FOURCC);
        data.extend_from_slice(&640u16.to_le_bytes());
        data.extend_from_slice(&360u16.to_le_bytes());
        data.extend_from_slice(&30u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&(frames.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for (pts, frame) in frames.iter().enumerate() {
            data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            data.extend_from_slice(&(pts as u64).to_le_bytes());
            data.extend_from_slice(frame);
        }
        data
    }

    fn metadata() -> LooperMetadata {
        LooperMetadata {
            width: 640,
            height: 360,
            bitrate_bps: 600_000,
            frame_rate: 20,
        }
    }

    #[test]
    fn test_parse_header() {
        let data = ivf(&[&[1, 2, 3]]);
        let header = parse_ivf_header(&data).unwrap();
        assert_eq!((header.width, header.height), (640, 360));
        assert_eq!(header.timebase_den, 30);
        assert_eq!(header.frame_count, 1);
        assert_eq!(header.header_len, 32);
    }

    #[test]
    fn test_looper_replays_frames() {
        let data = ivf(&[&[0x10, 0x02], &[0x11], &[0x12, 0x00, 0x01]]);
        let mut looper = Vp8Looper::new(&mut Cursor::new(data), metadata()).unwrap();
        assert_eq!(looper.codec_info().mime_type, "video/VP8");
        assert_eq!(looper.header().frame_count, 3);

        let first = looper.next_sample();
        assert_eq!(first.data.as_ref(), &[0x10, 0x02]);
        assert_eq!(first.duration, Duration::from_millis(50));
        looper.next_sample();
        assert_eq!(looper.next_sample().data.len(), 3);
        assert_eq!(looper.loop_count(), 1);
        assert_eq!(looper.next_sample().data.as_ref(), &[0x10, 0x02]);
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut data = ivf(&[&[1]]);
        data[0] = b'X';
        let err = Vp8Looper::new(&mut Cursor::new(data), metadata()).unwrap_err();
        assert!(err.to_string().contains("DKIF"));
    }

    #[test]
    fn test_rejects_wrong_fourcc() {
        let mut data = ivf(&[&[1]]);
        data[8..12].copy_from_slice(b"VP90");
        let err = Vp8Looper::new(&mut Cursor::new(data), metadata()).unwrap_err();
        assert!(err.to_string().contains("VP90"));
    }

    #[test]
    fn test_rejects_truncated_frame() {
        let mut data = ivf(&[&[1, 2, 3, 4]]);
        data.truncate(data.len() - 2);
        assert!(matches!(
            Vp8Looper::new(&mut Cursor::new(data), metadata()),
            Err(SynthcastError::LooperConstruction { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_file() {
        let data = ivf(&[]);
        assert!(Vp8Looper::new(&mut Cursor::new(data), metadata()).is_err());
    }
}
