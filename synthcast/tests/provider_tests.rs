//! Integration tests for the provider facade

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use ogg::writing::{PacketWriteEndInfo, PacketWriter};
use synthcast::*;

fn annex_b() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&[0, 0, 0, 1, 0x67, 0x42, 0x00, 0x1F]);
    data.extend_from_slice(&[0, 0, 0, 1, 0x65, 0x88, 0x84, 0x21]);
    data
}

fn ivf() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"DKIF");
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&32u16.to_le_bytes());
    data.extend_from_slice(b"VP80");
    data.extend_from_slice(&640u16.to_le_bytes());
    data.extend_from_slice(&360u16.to_le_bytes());
    data.extend_from_slice(&30u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&[0x10, 0x02]);
    data
}

fn ogg_opus() -> Vec<u8> {
    let mut data = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut data);
        writer
            .write_packet(b"OpusHead\x01\x02".to_vec(), 9, PacketWriteEndInfo::EndPage, 0)
            .unwrap();
        writer
            .write_packet(vec![0xFC, 0x01], 9, PacketWriteEndInfo::EndStream, 960)
            .unwrap();
    }
    data
}

fn full_bundle() -> Arc<MemoryStore> {
    let mut store = MemoryStore::new();
    for theme in SpecCatalog::builtin().unwrap().themes() {
        for layer in theme.layers() {
            let data = match layer.codec {
                Codec::H264 => annex_b(),
                Codec::VP8 => ivf(),
            };
            store.insert(canonical_name(layer), data);
        }
    }
    for sample in AudioCatalog::builtin().unwrap().samples() {
        store.insert(AudioCatalog::resource_name(sample), ogg_opus());
    }
    Arc::new(store)
}

#[test]
fn test_configured_defaults() {
    let store = full_bundle();
    let provider = Provider::new(store).unwrap();
    assert_eq!(provider.config(), &ProviderConfig::default());

    // high tier, any codec, simulcast
    let loopers = provider.create_configured_video_loopers().unwrap();
    let heights: Vec<u32> = loopers.iter().map(|l| l.metadata().height).collect();
    assert_eq!(heights, vec![180, 360, 720]);
}

#[test]
fn test_from_config_applies_defaults() {
    let config = ProviderConfig {
        resolution: "medium".to_string(),
        codec_filter: "vp8".to_string(),
        simulcast: false,
        debug_logging: false,
    };
    let provider = Provider::from_config(full_bundle(), config).unwrap();

    let loopers = provider.create_configured_video_loopers().unwrap();
    assert_eq!(loopers.len(), 1);
    assert_eq!(loopers[0].codec_info().name, "VP8");
    assert_eq!(loopers[0].metadata().height, 360);
}

#[test]
fn test_from_config_rejects_unknown_codec() {
    let config = ProviderConfig {
        codec_filter: "av1".to_string(),
        ..ProviderConfig::default()
    };
    let err = Provider::from_config(full_bundle(), config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_explicit_request_overrides_config() {
    let provider = Provider::new(full_bundle()).unwrap();
    let loopers = provider.create_video_loopers("low", "h264", true).unwrap();
    assert_eq!(loopers.len(), 1);
    assert_eq!(loopers[0].metadata().height, 180);
}

#[test]
fn test_publisher_has_video_and_audio() {
    let provider = Provider::new(full_bundle()).unwrap();
    let mut publisher = provider.create_publisher().unwrap();
    assert_eq!(publisher.video.len(), 3);
    assert_eq!(publisher.audio.codec_info().mime_type, "audio/opus");
    assert_eq!(publisher.audio.next_sample().data.as_ref(), &[0xFC, 0x01]);
}

#[tokio::test]
async fn test_async_video_loopers() {
    let provider = Provider::new(full_bundle()).unwrap();
    let loopers = provider
        .create_video_loopers_async("very-high", "h264", true)
        .await
        .unwrap();
    let heights: Vec<u32> = loopers.iter().map(|l| l.metadata().height).collect();
    assert_eq!(heights, vec![360, 720, 1080]);
}

#[tokio::test]
async fn test_async_errors_propagate() {
    let provider = Provider::new(Arc::new(MemoryStore::new())).unwrap();
    let err = provider.create_audio_looper_async().await.unwrap_err();
    assert!(matches!(err, SynthcastError::ResourceNotFound { .. }));
}

#[tokio::test]
async fn test_concurrent_tasks_share_rotation() {
    let store = full_bundle();
    let provider = Provider::new(store.clone()).unwrap();

    let tasks = (0..30).map(|_| {
        let provider = provider.clone();
        async move {
            provider
                .create_video_loopers_async("low", "vp8", false)
                .await
                .unwrap()
        }
    });
    let results = join_all(tasks).await;

    let mut per_codec: HashMap<String, usize> = HashMap::new();
    for loopers in &results {
        assert_eq!(loopers.len(), 1);
        *per_codec.entry(loopers[0].codec_info().name).or_default() += 1;
    }
    assert_eq!(per_codec.get("VP8"), Some(&30));
    assert_eq!(provider.factory().theme_rotator().counter().current(), 30);
    assert_eq!(store.metrics().opens, 30);
    assert_eq!(store.metrics().open_handles, 0);
}

#[tokio::test]
async fn test_create_publishers() {
    let store = full_bundle();
    let provider = Provider::new(store.clone()).unwrap();

    let publishers = provider.create_publishers(7).await.unwrap();
    assert_eq!(publishers.len(), 7);
    let mut track_ids: Vec<&str> = publishers
        .iter()
        .flat_map(|p| p.video.iter().map(|v| v.track_id()))
        .collect();
    track_ids.sort_unstable();
    track_ids.dedup();
    assert_eq!(track_ids.len(), 21);
    assert_eq!(provider.factory().audio_rotator().counter().current(), 7);
    assert_eq!(store.metrics().open_handles, 0);
}

#[tokio::test]
async fn test_create_publishers_fails_as_a_whole() {
    let mut store = MemoryStore::new();
    for sample in AudioCatalog::builtin().unwrap().samples() {
        store.insert(AudioCatalog::resource_name(sample), ogg_opus());
    }
    let provider = Provider::new(Arc::new(store)).unwrap();

    let err = provider.create_publishers(3).await.unwrap_err();
    assert!(matches!(err, SynthcastError::ResourceNotFound { .. }));
}

#[test]
fn test_async_audio_outside_tokio_main() {
    let provider = Provider::new(full_bundle()).unwrap();
    let looper = tokio_test::block_on(provider.create_audio_looper_async()).unwrap();
    assert_eq!(looper.codec_info().clock_rate, 48_000);
    assert_eq!(looper.loop_count(), 0);
}

#[test]
fn test_debug_logging_installs_subscriber() {
    let config = ProviderConfig {
        debug_logging: true,
        ..ProviderConfig::default()
    };
    let provider = Provider::from_config(full_bundle(), config).unwrap();
    assert!(provider.config().debug_logging);
    // a subscriber is already in place, so a second install is refused
    assert!(!init_logging(false));
}
