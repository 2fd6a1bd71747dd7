//! Resource naming for video layers
//!
//! Naming is split in two: [`canonical_name`] is a pure function of the
//! layer, while [`resource_name`] probes the store for landscape 1080p layers
//! and substitutes a 720p asset when the bundle lacks one.

use crate::catalog::VideoLayerSpec;
use crate::codecs::Codec;
use synthcast_core::{resource_path, ResourceStore};
use tracing::{debug, info};

/// Fallback bitrate used when no themed entry exists
pub const BASELINE_FALLBACK_KBPS: u32 = 2000;

/// Themed 720p bitrates used when substituting a missing 1080p asset
const FALLBACK_BITRATES: &[(Codec, &str, u32)] = &[(Codec::H264, "cartoon", 1500)];

/// Bitrate of the 720p asset substituted for a missing 1080p one
pub fn fallback_bitrate_kbps(codec: Codec, theme: &str) -> u32 {
    FALLBACK_BITRATES
        .iter()
        .find(|(c, t, _)| *c == codec && *t == theme)
        .map(|(_, _, kbps)| *kbps)
        .unwrap_or(BASELINE_FALLBACK_KBPS)
}

/// Deterministic resource path of a layer
pub fn canonical_name(layer: &VideoLayerSpec) -> String {
    let name = format!(
        "{}_{}_{}",
        layer.theme,
        layer.size_label(),
        layer.bitrate_kbps
    );
    resource_path(&name, layer.codec.extension())
}

/// 720p path substituted for a missing 1080p asset
pub fn fallback_name(codec: Codec, theme: &str) -> String {
    let name = format!("{}_720_{}", theme, fallback_bitrate_kbps(codec, theme));
    resource_path(&name, codec.extension())
}

/// Whether the layer is subject to the 1080p probe
pub fn needs_probe(layer: &VideoLayerSpec) -> bool {
    !layer.is_portrait() && layer.height == 1080
}

/// Resolve the path a layer's asset is read from
///
/// Only landscape 1080p layers touch the store; every other layer resolves
/// to its canonical name.
pub fn resource_name(layer: &VideoLayerSpec, store: &dyn ResourceStore) -> String {
    let canonical = canonical_name(layer);
    if !needs_probe(layer) {
        return canonical;
    }

    if store.exists(&canonical) {
        debug!(path = %canonical, "Using native 1080p asset");
        return canonical;
    }

    let fallback = fallback_name(layer.codec, &layer.theme);
    info!(
        missing = %canonical,
        fallback = %fallback,
        "1080p asset not bundled, falling back to 720p"
    );
    fallback
}
