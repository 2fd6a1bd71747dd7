//! Spec catalog of bundled video themes and audio samples
//!
//! The catalog is built once at startup and never mutated. Each [`Theme`]
//! holds an ordered list of quality layers encoded with a single codec.

use crate::codecs::Codec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use synthcast_core::{SynthcastError, SynthcastResult};

/// Width of the synthesized 1080p layer
pub const HD_WIDTH: u32 = 1920;
/// Height of the synthesized 1080p layer
pub const HD_HEIGHT: u32 = 1080;
/// Bitrate of the synthesized 1080p layer in kbps
pub const HD_BITRATE_KBPS: u32 = 4000;
/// Frame rate of the synthesized 1080p layer
pub const HD_FRAME_RATE: u32 = 30;
/// Largest layer bitrate whose bits-per-second value fits in a `u32`
pub const MAX_BITRATE_KBPS: u32 = u32::MAX / 1000;

/// Quality slot a layer occupies within its theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rung {
    /// 180p
    R180,
    /// 360p
    R360,
    /// 720p
    R720,
    /// 1080p
    R1080,
}

impl Rung {
    /// All rungs in ascending quality order
    pub const ALL: [Rung; 4] = [Rung::R180, Rung::R360, Rung::R720, Rung::R1080];

    /// Nominal line count of the rung label
    pub fn lines(&self) -> u32 {
        match self {
            Rung::R180 => 180,
            Rung::R360 => 360,
            Rung::R720 => 720,
            Rung::R1080 => 1080,
        }
    }
}

impl fmt::Display for Rung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.lines())
    }
}

impl FromStr for Rung {
    type Err = SynthcastError;

    /// Parse `"720"` or `"720p"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let digits = label
            .strip_suffix('p')
            .or_else(|| label.strip_suffix('P'))
            .unwrap_or(label);
        let lines: u32 = digits
            .parse()
            .map_err(|_| SynthcastError::InvalidConfiguration {
                message: format!("Invalid resolution label '{}'", s),
            })?;
        Rung::ALL
            .into_iter()
            .find(|rung| rung.lines() == lines)
            .ok_or_else(|| SynthcastError::InvalidConfiguration {
                message: format!("Unsupported resolution label '{}'", s),
            })
    }
}

/// Simulcast quality a published layer is announced as
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    /// Lowest layer
    Low,
    /// Middle layer
    Medium,
    /// Top layer
    High,
}

impl VideoQuality {
    /// Quality of the layer at `index` in an ascending plan
    ///
    /// Layers past the third share `High`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => VideoQuality::Low,
            1 => VideoQuality::Medium,
            _ => VideoQuality::High,
        }
    }
}

/// Layer description a publisher announces for a video track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLayer {
    /// Simulcast quality
    pub quality: VideoQuality,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bitrate in bits per second
    pub bitrate_bps: u32,
}

/// One quality layer of a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLayerSpec {
    /// Codec the asset is encoded with
    pub codec: Codec,
    /// Theme name, used as the resource name prefix
    pub theme: String,
    /// Quality slot
    pub rung: Rung,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bitrate in kbps
    pub bitrate_kbps: u32,
    /// Frames per second
    pub frame_rate: u32,
    /// Built per request rather than taken from the catalog
    #[serde(default)]
    pub synthesized: bool,
}

impl VideoLayerSpec {
    /// Landscape 16:9 layer at the given rung
    pub fn landscape(
        codec: Codec,
        theme: &str,
        rung: Rung,
        bitrate_kbps: u32,
        frame_rate: u32,
    ) -> Self {
        let height = rung.lines();
        Self {
            codec,
            theme: theme.to_string(),
            rung,
            width: height * 16 / 9,
            height,
            bitrate_kbps,
            frame_rate,
            synthesized: false,
        }
    }

    /// Portrait 3:4 layer of the given width
    pub fn portrait(
        codec: Codec,
        theme: &str,
        rung: Rung,
        width: u32,
        bitrate_kbps: u32,
        frame_rate: u32,
    ) -> Self {
        Self {
            codec,
            theme: theme.to_string(),
            rung,
            width,
            height: width * 4 / 3,
            bitrate_kbps,
            frame_rate,
            synthesized: false,
        }
    }

    /// Fresh 1080p layer derived from a lower layer of the same theme
    pub fn synthesized_hd(base: &VideoLayerSpec) -> Self {
        Self {
            codec: base.codec,
            theme: base.theme.clone(),
            rung: Rung::R1080,
            width: HD_WIDTH,
            height: HD_HEIGHT,
            bitrate_kbps: HD_BITRATE_KBPS,
            frame_rate: HD_FRAME_RATE,
            synthesized: true,
        }
    }

    /// Bitrate in bits per second, saturating at `u32::MAX`
    pub fn bitrate_bps(&self) -> u32 {
        self.bitrate_kbps.saturating_mul(1000)
    }

    /// Simulcast layer description announced for this spec
    pub fn to_video_layer(&self, quality: VideoQuality) -> VideoLayer {
        VideoLayer {
            quality,
            width: self.width,
            height: self.height,
            bitrate_bps: self.bitrate_bps(),
        }
    }

    /// Whether the layer is taller than it is wide
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Size component of the resource name
    ///
    /// Landscape layers use their height, portrait layers `p<width>`.
    pub fn size_label(&self) -> String {
        if self.is_portrait() {
            format!("p{}", self.width)
        } else {
            self.height.to_string()
        }
    }

    /// `WxH` string for logging
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Ordered quality layers sharing one name and one codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: String,
    codec: Codec,
    layers: Vec<VideoLayerSpec>,
}

impl Theme {
    /// Build a theme, validating layer ordering and consistency
    pub fn new(name: &str, codec: Codec, layers: Vec<VideoLayerSpec>) -> SynthcastResult<Self> {
        if name.trim().is_empty() {
            return Err(SynthcastError::InvalidCatalog {
                reason: "theme name must not be empty".to_string(),
            });
        }

        for layer in &layers {
            if layer.theme != name || layer.codec != codec {
                return Err(SynthcastError::InvalidCatalog {
                    reason: format!(
                        "layer {}/{} does not belong to theme {}/{}",
                        layer.theme, layer.codec, name, codec
                    ),
                });
            }
            if layer.width == 0
                || layer.height == 0
                || layer.bitrate_kbps == 0
                || layer.frame_rate == 0
            {
                return Err(SynthcastError::InvalidCatalog {
                    reason: format!("theme {} has a layer with a zero parameter", name),
                });
            }
            if layer.bitrate_kbps > MAX_BITRATE_KBPS {
                return Err(SynthcastError::InvalidCatalog {
                    reason: format!(
                        "theme {} layer {} bitrate {} kbps exceeds {} kbps",
                        name,
                        layer.dimensions(),
                        layer.bitrate_kbps,
                        MAX_BITRATE_KBPS
                    ),
                });
            }
        }

        for pair in layers.windows(2) {
            if pair[1].height <= pair[0].height || pair[1].rung <= pair[0].rung {
                return Err(SynthcastError::InvalidCatalog {
                    reason: format!(
                        "theme {} layers must ascend in quality ({} then {})",
                        name,
                        pair[0].dimensions(),
                        pair[1].dimensions()
                    ),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            codec,
            layers,
        })
    }

    /// Theme of 16:9 layers at 180p/360p/720p/1080p
    ///
    /// Frame rates are 15, 20, 30 and 30 fps. Supplying fewer bitrates
    /// yields a theme with only the lowest rungs.
    pub fn landscape(name: &str, codec: Codec, bitrates_kbps: &[u32]) -> SynthcastResult<Self> {
        const FRAME_RATES: [u32; 4] = [15, 20, 30, 30];
        if bitrates_kbps.len() > Rung::ALL.len() {
            return Err(SynthcastError::InvalidCatalog {
                reason: format!("theme {} has more than {} rungs", name, Rung::ALL.len()),
            });
        }
        let layers = bitrates_kbps
            .iter()
            .zip(Rung::ALL.into_iter().zip(FRAME_RATES))
            .map(|(&kbps, (rung, fps))| VideoLayerSpec::landscape(codec, name, rung, kbps, fps))
            .collect();
        Self::new(name, codec, layers)
    }

    /// Theme name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec of every layer
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Layers in ascending quality order
    pub fn layers(&self) -> &[VideoLayerSpec] {
        &self.layers
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the theme has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer occupying the given rung, if any
    pub fn layer(&self, rung: Rung) -> Option<&VideoLayerSpec> {
        self.layers.iter().find(|layer| layer.rung == rung)
    }
}

/// Immutable table of content themes
#[derive(Debug, Clone)]
pub struct SpecCatalog {
    themes: Vec<Arc<Theme>>,
}

impl SpecCatalog {
    /// Build a catalog from themes
    pub fn new(themes: Vec<Theme>) -> SynthcastResult<Self> {
        if themes.is_empty() {
            return Err(SynthcastError::InvalidCatalog {
                reason: "catalog must contain at least one theme".to_string(),
            });
        }
        Ok(Self {
            themes: themes.into_iter().map(Arc::new).collect(),
        })
    }

    /// Catalog of the themes shipped in the asset bundle
    pub fn builtin() -> SynthcastResult<Self> {
        let circles = Theme::new(
            "circles",
            Codec::H264,
            vec![
                VideoLayerSpec::portrait(Codec::H264, "circles", Rung::R180, 180, 200, 15),
                VideoLayerSpec::portrait(Codec::H264, "circles", Rung::R360, 360, 700, 20),
                VideoLayerSpec::portrait(Codec::H264, "circles", Rung::R720, 540, 2000, 30),
                VideoLayerSpec::portrait(Codec::H264, "circles", Rung::R1080, 1080, 4000, 30),
            ],
        )?;

        Self::new(vec![
            Theme::landscape("butterfly", Codec::H264, &[150, 400, 2000, 4000])?,
            Theme::landscape("cartoon", Codec::H264, &[120, 400, 1500, 3500])?,
            Theme::landscape("crescent", Codec::VP8, &[150, 600, 2000, 4000])?,
            Theme::landscape("neon", Codec::VP8, &[150, 600, 2000, 4000])?,
            Theme::landscape("tunnel", Codec::VP8, &[150, 600, 2000, 4000])?,
            circles,
        ])
    }

    /// All themes in catalog order
    pub fn themes(&self) -> &[Arc<Theme>] {
        &self.themes
    }

    /// Themes matching a codec filter, in catalog order
    pub fn filtered(&self, codec_filter: &str) -> Vec<Arc<Theme>> {
        self.themes
            .iter()
            .filter(|theme| theme.codec().matches_filter(codec_filter))
            .cloned()
            .collect()
    }

    /// Look up a theme by name
    pub fn theme(&self, name: &str) -> Option<&Arc<Theme>> {
        self.themes.iter().find(|theme| theme.name() == name)
    }
}

/// Extension of bundled audio samples
pub const AUDIO_EXTENSION: &str = "ogg";

/// Fixed list of audio sample names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCatalog {
    samples: Vec<String>,
}

impl AudioCatalog {
    /// Build an audio catalog from sample names
    pub fn new<I, S>(samples: I) -> SynthcastResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let samples: Vec<String> = samples.into_iter().map(Into::into).collect();
        if samples.is_empty() {
            return Err(SynthcastError::InvalidCatalog {
                reason: "audio catalog must contain at least one sample".to_string(),
            });
        }
        Ok(Self { samples })
    }

    /// Samples shipped in the asset bundle
    pub fn builtin() -> SynthcastResult<Self> {
        Self::new([
            "change-amelia",
            "change-benjamin",
            "change-elena",
            "change-clint",
            "change-emma",
            "change-ken",
            "change-sophie",
        ])
    }

    /// Sample names in order
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Resource path of a sample
    pub fn resource_name(sample: &str) -> String {
        synthcast_core::resource_path(sample, AUDIO_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rung_parse() {
        assert_eq!("180".parse::<Rung>().unwrap(), Rung::R180);
        assert_eq!("360p".parse::<Rung>().unwrap(), Rung::R360);
        assert_eq!(" 720P ".parse::<Rung>().unwrap(), Rung::R720);
        assert_eq!("1080".parse::<Rung>().unwrap(), Rung::R1080);
        assert!("999".parse::<Rung>().is_err());
        assert!("abc".parse::<Rung>().is_err());
        assert!("".parse::<Rung>().is_err());
        assert_eq!(Rung::R720.to_string(), "720p");
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = SpecCatalog::builtin().unwrap();
        assert_eq!(catalog.themes().len(), 6);
        assert_eq!(catalog.filtered("h264").len(), 3);
        assert_eq!(catalog.filtered("vp8").len(), 3);
        assert_eq!(catalog.filtered("").len(), 6);
        assert!(catalog.filtered("vp9").is_empty());

        for theme in catalog.themes() {
            assert_eq!(theme.len(), 4, "theme {}", theme.name());
            for pair in theme.layers().windows(2) {
                assert!(pair[0].height < pair[1].height);
            }
        }
    }

    #[test]
    fn test_builtin_layer_parameters() {
        let catalog = SpecCatalog::builtin().unwrap();
        let cartoon = catalog.theme("cartoon").unwrap();
        let hd = cartoon.layer(Rung::R1080).unwrap();
        assert_eq!((hd.width, hd.height), (1920, 1080));
        assert_eq!(hd.bitrate_kbps, 3500);
        assert_eq!(hd.bitrate_bps(), 3_500_000);
        assert_eq!(hd.frame_rate, 30);

        let low = cartoon.layer(Rung::R180).unwrap();
        assert_eq!((low.width, low.height, low.frame_rate), (320, 180, 15));

        let circles = catalog.theme("circles").unwrap();
        let mid = circles.layer(Rung::R720).unwrap();
        assert_eq!((mid.width, mid.height), (540, 720));
        assert!(mid.is_portrait());
        assert_eq!(mid.size_label(), "p540");
    }

    #[test]
    fn test_theme_rejects_unordered_layers() {
        let layers = vec![
            VideoLayerSpec::landscape(Codec::VP8, "neon", Rung::R360, 600, 20),
            VideoLayerSpec::landscape(Codec::VP8, "neon", Rung::R180, 150, 15),
        ];
        let err = Theme::new("neon", Codec::VP8, layers).unwrap_err();
        assert!(matches!(err, SynthcastError::InvalidCatalog { .. }));
    }

    #[test]
    fn test_theme_rejects_foreign_layers() {
        let layers = vec![VideoLayerSpec::landscape(Codec::H264, "neon", Rung::R180, 150, 15)];
        assert!(Theme::new("neon", Codec::VP8, layers).is_err());
    }

    #[test]
    fn test_theme_rejects_oversized_bitrate() {
        let err = Theme::landscape("big", Codec::H264, &[5_000_000]).unwrap_err();
        assert!(matches!(err, SynthcastError::InvalidCatalog { .. }));
        assert!(err.to_string().contains("exceeds"));

        let edge = Theme::landscape("edge", Codec::H264, &[MAX_BITRATE_KBPS]).unwrap();
        assert_eq!(edge.layers()[0].bitrate_bps(), MAX_BITRATE_KBPS * 1000);
    }

    #[test]
    fn test_unvalidated_layer_bitrate_saturates() {
        let layer = VideoLayerSpec::landscape(Codec::VP8, "raw", Rung::R180, u32::MAX, 15);
        assert_eq!(layer.bitrate_bps(), u32::MAX);
    }

    #[test]
    fn test_to_video_layer() {
        let catalog = SpecCatalog::builtin().unwrap();
        let layer = catalog
            .theme("neon")
            .unwrap()
            .layer(Rung::R360)
            .unwrap()
            .to_video_layer(VideoQuality::Medium);
        assert_eq!(
            layer,
            VideoLayer {
                quality: VideoQuality::Medium,
                width: 640,
                height: 360,
                bitrate_bps: 600_000,
            }
        );
        assert_eq!(VideoQuality::from_index(0), VideoQuality::Low);
        assert_eq!(VideoQuality::from_index(5), VideoQuality::High);
    }

    #[test]
    fn test_partial_landscape_theme() {
        let theme = Theme::landscape("tunnel", Codec::VP8, &[150, 600, 2000]).unwrap();
        assert_eq!(theme.len(), 3);
        assert!(theme.layer(Rung::R1080).is_none());
        assert!(Theme::landscape("tunnel", Codec::VP8, &[1, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn test_synthesized_hd_is_fresh() {
        let theme = Theme::landscape("crescent", Codec::VP8, &[150, 600, 2000]).unwrap();
        let base = theme.layer(Rung::R720).unwrap();
        let hd = VideoLayerSpec::synthesized_hd(base);
        assert_eq!((hd.width, hd.height), (1920, 1080));
        assert_eq!(hd.bitrate_kbps, 4000);
        assert_eq!(hd.codec, Codec::VP8);
        assert_eq!(hd.theme, "crescent");
        assert!(hd.synthesized);
        assert_eq!(theme.len(), 3);
    }

    #[test]
    fn test_audio_catalog() {
        let audio = AudioCatalog::builtin().unwrap();
        assert_eq!(audio.samples().len(), 7);
        assert_eq!(
            AudioCatalog::resource_name("change-emma"),
            "resources/change-emma.ogg"
        );
        assert!(AudioCatalog::new(Vec::<String>::new()).is_err());
    }
}
