use super::*;

const VIDEO_WITH_AUDIO: &str = r#"{
  "streams": [
    { "codec_type": "video", "codec_name": "h264", "width": 64, "height": 48,
      "pix_fmt": "yuv420p", "r_frame_rate": "30000/1001", "avg_frame_rate": "30000/1001",
      "nb_frames": "90" },
    { "codec_type": "audio", "codec_name": "aac" }
  ],
  "format": { "format_name": "mov,mp4,m4a,3gp,3g2,mj2" }
}"#;

const STREAM_WITHOUT_COUNT: &str = r#"{
  "streams": [
    { "codec_type": "video", "width": 32, "height": 32, "r_frame_rate": "0/0",
      "avg_frame_rate": "0/0" }
  ],
  "format": { "format_name": "matroska,webm" }
}"#;

const PNG: &str = r#"{
  "streams": [ { "codec_type": "video", "codec_name": "png", "width": 2, "height": 2,
                 "pix_fmt": "rgba", "r_frame_rate": "25/1" } ],
  "format": { "format_name": "png_pipe" }
}"#;

const GIF: &str = r#"{
  "streams": [ { "codec_type": "video", "codec_name": "gif", "width": 8, "height": 4,
                 "pix_fmt": "bgra", "r_frame_rate": "100/3", "avg_frame_rate": "50/3" } ],
  "format": { "format_name": "gif" }
}"#;

fn descriptor(json: &str, animation: Option<&AnimationMetadata>) -> MediaDescriptor {
    ProbeReport::from_json(json.as_bytes())
        .unwrap()
        .into_descriptor(Path::new("in.bin"), animation)
        .unwrap()
}

#[test]
fn video_with_audio_is_described() {
    let d = descriptor(VIDEO_WITH_AUDIO, None);
    assert_eq!(d.shape, MediaShape::Video);
    assert_eq!((d.width, d.height), (64, 48));
    assert_eq!(d.frame_count, Some(90));
    assert!((d.frame_rate_hz() - 29.97).abs() < 0.01);
    assert!(d.has_audio);
    assert_eq!(d.audio_codec.as_deref(), Some("aac"));
    assert_eq!(d.container, "mov");
    assert_eq!(d.pixel_format.as_deref(), Some("yuv420p"));
}

#[test]
fn unknown_frame_count_and_zero_rate_do_not_fail() {
    let d = descriptor(STREAM_WITHOUT_COUNT, None);
    assert_eq!(d.frame_count, None);
    assert_eq!(d.frame_rate_hz(), 0.0);
    assert!(!d.has_audio);
}

#[test]
fn still_image_has_one_frame_and_no_audio() {
    let d = descriptor(PNG, None);
    assert_eq!(d.shape, MediaShape::StillImage);
    assert_eq!(d.frame_count, Some(1));
    assert!(!d.has_audio);
    assert!(!d.is_multi_frame_animated());
}

#[test]
fn gif_shape_follows_its_frame_count() {
    let report = ProbeReport::from_json(GIF.as_bytes()).unwrap();
    assert!(report.is_gif());

    let anim = AnimationMetadata {
        delays_cs: vec![10, 20, 30],
        loop_count: Some(0),
    };
    let d = descriptor(GIF, Some(&anim));
    assert_eq!(d.shape, MediaShape::AnimatedImage);
    assert!(d.is_multi_frame_animated());
    assert_eq!(d.frame_count, Some(3));
    assert_eq!(d.animation.as_ref(), Some(&anim));

    let single = AnimationMetadata {
        delays_cs: vec![0],
        loop_count: None,
    };
    let still = descriptor(GIF, Some(&single));
    assert_eq!(still.shape, MediaShape::StillImage);
    assert!(still.animation.is_none());
}

#[test]
fn missing_video_stream_is_fatal_input() {
    let json = r#"{ "streams": [ { "codec_type": "audio" } ], "format": { "format_name": "wav" } }"#;
    let err = ProbeReport::from_json(json.as_bytes())
        .unwrap()
        .into_descriptor(Path::new("a.wav"), None)
        .unwrap_err();
    assert!(matches!(err, MoshError::FatalInput(_)));
}

#[test]
fn malformed_json_is_fatal_input() {
    assert!(matches!(
        ProbeReport::from_json(b"{ nope").err().unwrap(),
        MoshError::FatalInput(_)
    ));
}
