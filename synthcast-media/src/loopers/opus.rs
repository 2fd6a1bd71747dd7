//! Opus-in-Ogg looper

use super::{read_stream, AudioLooper, MediaSample, SampleLoop};
use crate::codecs::CodecInfo;
use bytes::Bytes;
use ogg::reading::PacketReader;
use std::io::{Cursor, Read};
use std::time::Duration;
use synthcast_core::{SynthcastError, SynthcastResult};
use tracing::debug;

const CODEC_NAME: &str = "Opus";

/// Magic of the Opus identification header
pub const OPUS_HEAD: &[u8; 8] = b"OpusHead";
/// Magic of the Opus comment header
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";
/// Duration of each replayed Opus packet
pub const OPUS_FRAME_DURATION: Duration = Duration::from_millis(20);

/// Read every packet of an Ogg stream
///
/// Page checksums are verified; a corrupt or truncated page fails the read.
pub fn read_ogg_packets(data: Bytes) -> SynthcastResult<Vec<Bytes>> {
    let mut reader = PacketReader::new(Cursor::new(data));
    let mut packets = Vec::new();
    while let Some(packet) = reader
        .read_packet()
        .map_err(|e| SynthcastError::looper(CODEC_NAME, format!("Ogg read failed: {}", e)))?
    {
        packets.push(Bytes::from(packet.data));
    }
    Ok(packets)
}

/// Replays the audio packets of an Ogg Opus stream at 20 ms each
#[derive(Debug)]
pub struct OpusLooper {
    track_id: String,
    samples: SampleLoop,
}

impl OpusLooper {
    /// Parse an Ogg Opus stream into a looper
    pub fn new(stream: &mut dyn Read) -> SynthcastResult<Self> {
        let data = read_stream(stream)?;
        let mut packets = read_ogg_packets(data)?.into_iter();

        match packets.next() {
            Some(head) if head.starts_with(OPUS_HEAD) => {}
            _ => {
                return Err(SynthcastError::looper(
                    CODEC_NAME,
                    "stream does not start with an OpusHead packet",
                ))
            }
        }

        let samples: Vec<MediaSample> = packets
            .filter(|packet| !packet.starts_with(OPUS_TAGS))
            .map(|packet| MediaSample {
                data: packet,
                duration: OPUS_FRAME_DURATION,
            })
            .collect();
        let samples = SampleLoop::new(samples, CODEC_NAME)?;

        debug!(packets = samples.len(), "Built Opus looper");

        Ok(Self {
            track_id: uuid::Uuid::new_v4().to_string(),
            samples,
        })
    }
}

impl AudioLooper for OpusLooper {
    fn codec_info(&self) -> CodecInfo {
        CodecInfo::opus()
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
    use ogg::writing::{PacketWriteEndInfo, PacketWriter};

    const SERIAL: u32 = 7;

    fn opus_stream(audio: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut writer = PacketWriter::new(&mut data);
            writer
                .write_packet(b"OpusHead\x01\x02".to_vec(), SERIAL, PacketWriteEndInfo::EndPage, 0)
                .unwrap();
            writer
                .write_packet(b"OpusTags".to_vec(), SERIAL, PacketWriteEndInfo::EndPage, 0)
                .unwrap();
            for (index, packet) in audio.iter().enumerate() {
                let end = if index + 1 == audio.len() {
                    PacketWriteEndInfo::EndStream
                } else {
                    PacketWriteEndInfo::NormalPacket
                };
                let granule = (index as u64 + 1) * 960;
                writer.write_packet(packet.to_vec(), SERIAL, end, granule).unwrap();
            }
        }
        data
    }

    fn sample_stream() -> Vec<u8> {
        let long_packet = vec![0xAB; 300];
        opus_stream(&[&[0xFC, 0x01], &long_packet])
    }

    #[test]
    fn test_read_packets_across_lacing() {
        let packets = read_ogg_packets(Bytes::from(sample_stream())).unwrap();
        assert_eq!(packets.len(), 4);
        assert!(packets[0].starts_with(OPUS_HEAD));
        assert!(packets[1].starts_with(OPUS_TAGS));
        assert_eq!(packets[2].as_ref(), &[0xFC, 0x01]);
        assert_eq!(packets[3].len(), 300);
    }

    #[test]
    fn test_looper_skips_headers() {
        let mut looper = OpusLooper::new(&mut Cursor::new(sample_stream())).unwrap();
        assert_eq!(looper.codec_info().clock_rate, 48_000);

        let first = looper.next_sample();
        assert_eq!(first.data.as_ref(), &[0xFC, 0x01]);
        assert_eq!(first.duration, OPUS_FRAME_DURATION);
        assert_eq!(looper.next_sample().data.len(), 300);
        assert_eq!(looper.loop_count(), 1);
    }

    #[test]
    fn test_rejects_corrupt_page() {
        let mut data = sample_stream();
        let last = data.len() - 1;
        data[last] ^= 0xFF;

        let err = OpusLooper::new(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SynthcastError::LooperConstruction { .. }));
    }

    #[test]
    fn test_rejects_non_opus_stream() {
        let mut data = Vec::new();
        {
            let mut writer = PacketWriter::new(&mut data);
            writer
                .write_packet(b"\x01vorbis".to_vec(), SERIAL, PacketWriteEndInfo::EndStream, 0)
                .unwrap();
        }
        let err = OpusLooper::new(&mut Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("OpusHead"));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = OpusLooper::new(&mut Cursor::new(b"not an ogg file at all, really".to_vec()))
            .unwrap_err();
        assert!(matches!(err, SynthcastError::LooperConstruction { .. }));
    }

    #[test]
    fn test_rejects_headers_only() {
        assert!(OpusLooper::new(&mut Cursor::new(opus_stream(&[]))).is_err());
    }
}
