use super::*;
use crate::FrameErrorKind;

#[test]
fn empty_object_is_all_defaults() {
    let cfg = FlipbookConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, FlipbookConfig::default());
    assert_eq!(
        cfg.source,
        SourceConfig::Local {
            dir: PathBuf::from("images")
        }
    );
    assert_eq!(cfg.cache.capacity, 50);
    assert_eq!(cfg.cache.eviction, EvictionPolicy::AdmissionCapped);
    assert_eq!(cfg.pipeline.max_width, 1200);
    assert_eq!(cfg.pipeline.quality, 85);
    assert_eq!(cfg.playback.tuning(), PlaybackTuning::default());
}

#[test]
fn parses_remote_source_and_overrides() {
    let cfg = FlipbookConfig::from_json_str(
        r#"{
            "source": { "remote": { "listing_url": "https://list.test/frames" } },
            "cache": { "capacity": 8, "eviction": "lru" },
            "pipeline": { "quality": 70 },
            "playback": { "idle_timeout_ms": 1500, "tick_hz": 30 }
        }"#,
    )
    .unwrap();

    assert_eq!(
        cfg.source,
        SourceConfig::Remote {
            listing_url: "https://list.test/frames".to_string(),
            timeout_secs: 15,
        }
    );
    assert_eq!(cfg.cache.eviction, EvictionPolicy::Lru);
    assert_eq!(cfg.pipeline.max_width, 1200);
    assert_eq!(cfg.pipeline.quality, 70);
    assert_eq!(cfg.playback.tuning().idle_timeout, Duration::from_millis(1500));
    assert!((cfg.playback.tick_interval().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
}

#[test]
fn rejects_invalid_values() {
    let bad = [
        r#"{ "cache": { "capacity": 0 } }"#,
        r#"{ "pipeline": { "quality": 0 } }"#,
        r#"{ "pipeline": { "quality": 101 } }"#,
        r#"{ "pipeline": { "max_width": 0 } }"#,
        r#"{ "playback": { "dead_zone": 1.0 } }"#,
        r#"{ "playback": { "max_speed": -1.0 } }"#,
        r#"{ "playback": { "auto_speed": -2.0 } }"#,
        r#"{ "playback": { "tick_hz": 0 } }"#,
        r#"{ "source": { "remote": { "listing_url": "" } } }"#,
        r#"{ "source": { "remote": { "listing_url": "https://x", "timeout_secs": 0 } } }"#,
        r#"{ "unknown": true }"#,
        r#"not json"#,
    ];
    for s in bad {
        let err = FlipbookConfig::from_json_str(s).unwrap_err();
        assert_eq!(err.kind(), FrameErrorKind::Config, "{s}");
    }
}

#[test]
fn missing_file_is_config_error() {
    let err = FlipbookConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
}
