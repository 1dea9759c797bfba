use super::*;
use crate::effects::chain::Effect;
use crate::media::probe::MediaShape;

fn media(rate: FrameRate) -> MediaDescriptor {
    MediaDescriptor {
        path: PathBuf::from("in.mp4"),
        width: 64,
        height: 48,
        pixel_format: Some("yuv420p".to_string()),
        frame_count: None,
        frame_rate: rate,
        has_audio: false,
        audio_codec: None,
        container: "mov".to_string(),
        shape: MediaShape::Video,
        animation: None,
    }
}

#[test]
fn defaults_match_the_documented_values() {
    let cfg = PipelineConfig::resolve(None, ConfigOverrides::default()).unwrap();
    assert_eq!(cfg.bit_depth, BitDepth::Eight);
    assert_eq!(cfg.pixel_format, PixelFormat::Rgb24);
    assert_eq!(cfg.sample_rate, 44_100);
    assert!(cfg.resolution.is_none());
    assert!(cfg.blend.is_none());
    assert!(cfg.effects.is_empty());
}

#[test]
fn command_line_wins_over_config_file() {
    let file: ConfigOverrides = serde_json::from_str(
        r#"{
            "bit_depth": 16,
            "pixel_format": "bgr24",
            "resolution": "32x16",
            "blend": 0.5,
            "effects": [{ "name": "echo", "params": ["0.8", "0.9", "1000", "0.3"] }]
        }"#,
    )
    .unwrap();
    let cli = ConfigOverrides {
        bit_depth: Some(BitDepth::TwentyFour),
        frame_rate: Some("30000/1001".parse().unwrap()),
        ..ConfigOverrides::default()
    };

    let cfg = PipelineConfig::resolve(Some(file), cli).unwrap();
    assert_eq!(cfg.bit_depth, BitDepth::TwentyFour);
    assert_eq!(cfg.pixel_format, PixelFormat::Bgr24);
    assert_eq!(cfg.resolution, Some(Resolution::new(32, 16).unwrap()));
    assert_eq!(cfg.blend.map(BlendFactor::value), Some(0.5));
    assert_eq!(
        cfg.frame_rate,
        Some(FrameRate {
            num: 30000,
            den: 1001
        })
    );
    assert_eq!(
        cfg.effects.effects(),
        &[Effect::new("echo", ["0.8", "0.9", "1000", "0.3"])]
    );
}

#[test]
fn config_files_reject_unknown_keys_and_bad_values() {
    assert!(serde_json::from_str::<ConfigOverrides>(r#"{ "bits": 8 }"#).is_err());
    assert!(serde_json::from_str::<ConfigOverrides>(r#"{ "bit_depth": 12 }"#).is_err());
    assert!(serde_json::from_str::<ConfigOverrides>(r#"{ "blend": 1.5 }"#).is_err());
}

#[test]
fn config_file_errors_are_usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "nope": true }"#).unwrap();
    assert!(ConfigOverrides::from_json_file(&path).unwrap_err().is_usage());
    assert!(
        ConfigOverrides::from_json_file(&dir.path().join("missing.json"))
            .unwrap_err()
            .is_usage()
    );
}

#[test]
fn validation_rejects_zero_rates_and_threads() {
    let zero_rate = ConfigOverrides {
        frame_rate: Some(FrameRate { num: 0, den: 1 }),
        ..ConfigOverrides::default()
    };
    assert!(PipelineConfig::resolve(None, zero_rate).is_err());

    let zero_threads = ConfigOverrides {
        threads: Some(0),
        ..ConfigOverrides::default()
    };
    assert!(PipelineConfig::resolve(None, zero_threads).is_err());
}

#[test]
fn layout_and_rate_fall_back_to_the_source() {
    let cfg = PipelineConfig::default();
    let layout = cfg.target_layout(&media(FrameRate::integer(25))).unwrap();
    assert_eq!((layout.width, layout.height), (64, 48));
    assert_eq!(layout.format, PixelFormat::Rgb24);
    assert_eq!(
        cfg.output_frame_rate(&media(FrameRate::integer(25))),
        FrameRate::integer(25)
    );
    assert_eq!(
        cfg.output_frame_rate(&media(FrameRate { num: 0, den: 0 })),
        FrameRate::integer(FALLBACK_FRAME_RATE)
    );

    let scaled = PipelineConfig {
        resolution: Some(Resolution::new(8, 6).unwrap()),
        frame_rate: Some(FrameRate::integer(12)),
        ..PipelineConfig::default()
    };
    let layout = scaled.target_layout(&media(FrameRate::integer(25))).unwrap();
    assert_eq!((layout.width, layout.height), (8, 6));
    assert_eq!(
        scaled.output_frame_rate(&media(FrameRate::integer(25))),
        FrameRate::integer(12)
    );
}
