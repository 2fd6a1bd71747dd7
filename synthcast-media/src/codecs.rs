//! Codec identifiers and negotiated codec information

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use synthcast_core::SynthcastError;

/// RTP clock rate shared by all video codecs
pub const VIDEO_CLOCK_RATE: u32 = 90_000;

/// Opus clock rate
pub const OPUS_CLOCK_RATE: u32 = 48_000;

/// Video codecs that bundled themes are encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// H.264 Annex-B elementary stream
    H264,
    /// VP8 in an IVF container
    VP8,
}

impl Codec {
    /// All known video codecs
    pub const ALL: [Codec; 2] = [Codec::H264, Codec::VP8];

    /// Identifier used in codec filters
    pub fn id(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::VP8 => "vp8",
        }
    }

    /// File extension of the bundled asset
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::VP8 => "ivf",
        }
    }

    /// Human readable codec name
    pub fn display_name(&self) -> &'static str {
        match self {
            Codec::H264 => "H.264",
            Codec::VP8 => "VP8",
        }
    }

    /// Information a looper of this codec negotiates
    pub fn info(&self) -> CodecInfo {
        let mime_type = match self {
            Codec::H264 => "video/H264",
            Codec::VP8 => "video/VP8",
        };
        CodecInfo {
            name: self.display_name().to_string(),
            mime_type: mime_type.to_string(),
            clock_rate: VIDEO_CLOCK_RATE,
            channels: None,
        }
    }

    /// Whether a codec filter selects this codec
    ///
    /// An empty or blank filter selects every codec.
    pub fn matches_filter(&self, filter: &str) -> bool {
        let filter = filter.trim();
        filter.is_empty() || filter.eq_ignore_ascii_case(self.id())
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Codec {
    type Err = SynthcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codec::ALL
            .into_iter()
            .find(|codec| codec.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SynthcastError::InvalidConfiguration {
                message: format!(
                    "Unknown codec '{}'. Supported: {}",
                    s,
                    Codec::ALL.map(|c| c.id()).join(", ")
                ),
            })
    }
}

/// Codec information reported by a looper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    /// Codec name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// Clock rate in Hz
    pub clock_rate: u32,
    /// Channels (for audio)
    pub channels: Option<u8>,
}

impl CodecInfo {
    /// Opus stereo at 48 kHz
    pub fn opus() -> Self {
        Self {
            name: "Opus".to_string(),
            mime_type: "audio/opus".to_string(),
            clock_rate: OPUS_CLOCK_RATE,
            channels: Some(2),
        }
    }
}
