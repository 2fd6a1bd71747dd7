//! Load Publishers Demo
//!
//! Builds a synthetic asset bundle in memory, then creates loopers for a
//! handful of simulated publishers the way a load generator would, and
//! replays a few samples from each.

use ogg::writing::{PacketWriteEndInfo, PacketWriter};
use std::sync::Arc;
use synthcast::{
    canonical_name, init_logging, AudioCatalog, Codec, MemoryStore, Provider, ProviderConfig,
    SpecCatalog, SynthcastError,
};

const PUBLISHERS: usize = 6;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProviderConfig::from_json(r#"{"resolution": "high", "debug_logging": true}"#)?;
    init_logging(config.debug_logging);

    println!("🎬 synthcast Load Publishers Demo");
    println!("=================================");

    let store = Arc::new(synthetic_bundle()?);
    println!("📦 Bundle holds {} assets", store.len());

    let provider = Provider::from_config(store.clone(), config)?;

    // Demo 1: Simulcast publishers
    println!("\n📡 Demo 1: {} simulcast publishers", PUBLISHERS);
    println!("--------------------------------");
    let mut publishers = provider.create_publishers(PUBLISHERS).await?;
    for (index, publisher) in publishers.iter_mut().enumerate() {
        let layers: Vec<String> = publisher
            .video
            .iter()
            .map(|looper| {
                let meta = looper.metadata();
                format!("{}x{}@{}kbps", meta.width, meta.height, meta.bitrate_bps / 1000)
            })
            .collect();
        let audio = publisher.audio.next_sample();
        println!(
            "  Publisher {}: {} [{}] audio packet {} bytes",
            index,
            publisher.video[0].codec_info().name,
            layers.join(", "),
            audio.data.len()
        );
    }

    // Demo 2: Custom rung list without simulcast
    println!("\n🎯 Demo 2: Custom resolution \"360,1080\", single layer");
    println!("-----------------------------------------------------");
    for mut looper in provider.create_video_loopers("360,1080", "vp8", false)? {
        let meta = looper.metadata();
        println!("  {} {}x{}", looper.codec_info().name, meta.width, meta.height);
        for _ in 0..3 {
            let sample = looper.next_sample();
            println!("    sample {} bytes, {:?}", sample.data.len(), sample.duration);
        }
        println!("    loops completed: {}", looper.loop_count());
    }

    // Demo 3: Error handling
    println!("\n⚠️  Demo 3: Error handling");
    println!("-------------------------");
    match provider.create_video_loopers("high", "vp9", true) {
        Err(e @ SynthcastError::NoMatchingTheme { .. }) => {
            println!("  ✅ Rejected as expected: {} ({:?})", e, e.category())
        }
        Err(e) => println!("  ❌ Unexpected error: {}", e),
        Ok(_) => println!("  ❌ Unexpectedly succeeded"),
    }

    let metrics = store.metrics();
    println!(
        "\n📊 Store: {} opens, {} misses, {} open handles",
        metrics.opens, metrics.misses, metrics.open_handles
    );

    println!("\n✨ Load publishers demo completed!");
    Ok(())
}

/// Minimal playable assets for every catalog entry
///
/// 1080p assets are only bundled for butterfly, so the other themes fall
/// back to their 720p asset when the top rung is requested.
fn synthetic_bundle() -> Result<MemoryStore, SynthcastError> {
    let mut store = MemoryStore::new();
    for theme in SpecCatalog::builtin()?.themes() {
        for layer in theme.layers() {
            if layer.height == 1080 && theme.name() != "butterfly" {
                continue;
            }
            let data = match layer.codec {
                Codec::H264 => annex_b_stream(),
                Codec::VP8 => ivf_stream(layer.width as u16, layer.height as u16),
            };
            store.insert(canonical_name(layer), data);
        }
    }
    for sample in AudioCatalog::builtin()?.samples() {
        store.insert(AudioCatalog::resource_name(sample), ogg_opus_stream()?);
    }
    Ok(store)
}

fn annex_b_stream() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&[0, 0, 0, 1, 0x67, 0x42, 0x00, 0x1F]);
    data.extend_from_slice(&[0, 0, 0, 1, 0x68, 0xCE, 0x3C, 0x80]);
    for _ in 0..2 {
        data.extend_from_slice(&[0, 0, 0, 1, 0x65, 0x88, 0x84, 0x21, 0x40]);
    }
    data
}

fn ivf_stream(width: u16, height: u16) -> Vec<u8> {
    let frames: [&[u8]; 2] = [&[0x10, 0x02, 0x9D, 0x01], &[0x31, 0x01, 0x00]];
    let mut data = Vec::new();
    data.extend_from_slice(b"DKIF");
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&32u16.to_le_bytes());
    data.extend_from_slice(b"VP80");
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
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

fn ogg_opus_stream() -> Result<Vec<u8>, std::io::Error> {
    let packets: [&[u8]; 3] = [b"OpusHead\x01\x02\x38\x01", b"OpusTags", &[0xFC, 0xFF, 0xFE]];
    let mut data = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut data);
        for (index, packet) in packets.iter().enumerate() {
            let end = if index + 1 == packets.len() {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::EndPage
            };
            writer.write_packet(packet.to_vec(), 1, end, 0)?;
        }
    }
    Ok(data)
}
