use super::*;

#[test]
fn packed_frame_sizes_follow_bytes_per_pixel() {
    assert_eq!(PixelFormat::Rgb24.frame_bytes(2, 2), 12);
    assert_eq!(PixelFormat::Rgba.frame_bytes(3, 5), 60);
    assert_eq!(PixelFormat::Gray.frame_bytes(7, 3), 21);
    assert_eq!(PixelFormat::Rgb48le.frame_bytes(2, 1), 12);
}

#[test]
fn planar_frame_sizes_round_chroma_up() {
    assert_eq!(PixelFormat::Yuv420p.frame_bytes(4, 4), 16 + 2 * 4);
    assert_eq!(PixelFormat::Yuv420p.frame_bytes(3, 3), 9 + 2 * 4);
    assert_eq!(PixelFormat::Yuv422p.frame_bytes(3, 2), 6 + 2 * 2 * 2);
    assert_eq!(PixelFormat::Nv12.frame_bytes(4, 2), 8 + 4);
    assert_eq!(PixelFormat::Yuv444p.frame_bytes(4, 2), 24);
}

#[test]
fn pixel_format_parses_ffmpeg_names() {
    assert_eq!("rgb24".parse::<PixelFormat>().unwrap(), PixelFormat::Rgb24);
    assert_eq!("YUV420P".parse::<PixelFormat>().unwrap(), PixelFormat::Yuv420p);
    for f in PixelFormat::ALL {
        assert_eq!(f.ffmpeg_name().parse::<PixelFormat>().unwrap(), f);
    }
    let err = "rgb565".parse::<PixelFormat>().unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().contains("rgb24"));
}

#[test]
fn bit_depth_accepts_only_whole_byte_widths() {
    assert_eq!("8".parse::<BitDepth>().unwrap().bytes(), 1);
    assert_eq!("16".parse::<BitDepth>().unwrap().bytes(), 2);
    assert_eq!("24".parse::<BitDepth>().unwrap().bytes(), 3);
    assert!("12".parse::<BitDepth>().is_err());
    assert!("eight".parse::<BitDepth>().is_err());
    assert_eq!(BitDepth::default(), BitDepth::Eight);
}

#[test]
fn resolution_parses_w_x_h() {
    let r: Resolution = "640x480".parse().unwrap();
    assert_eq!((r.width, r.height), (640, 480));
    assert_eq!(r.to_string(), "640x480");
    assert!("640".parse::<Resolution>().is_err());
    assert!("0x480".parse::<Resolution>().is_err());
    assert!("axb".parse::<Resolution>().is_err());
}

#[test]
fn frame_rate_zero_denominator_reads_as_zero() {
    let r = FrameRate::from_ratio("0/0").unwrap();
    assert_eq!(r.as_f64(), 0.0);
    assert!(!r.is_positive());

    let r = FrameRate::from_ratio("30000/1001").unwrap();
    assert!((r.as_f64() - 29.97003).abs() < 1e-4);
}

#[test]
fn frame_rate_accepts_integer_decimal_and_rational() {
    assert_eq!("25".parse::<FrameRate>().unwrap(), FrameRate::integer(25));
    assert_eq!(
        "29.97".parse::<FrameRate>().unwrap(),
        FrameRate { num: 2997, den: 100 }
    );
    assert_eq!(
        "12.50".parse::<FrameRate>().unwrap(),
        FrameRate { num: 125, den: 10 }
    );
    assert_eq!(
        "24000/1001".parse::<FrameRate>().unwrap(),
        FrameRate {
            num: 24000,
            den: 1001
        }
    );
    assert!("fast".parse::<FrameRate>().is_err());
}

#[test]
fn config_types_round_trip_through_json() {
    let r: Resolution = serde_json::from_str("\"32x16\"").unwrap();
    assert_eq!(r, Resolution::new(32, 16).unwrap());
    let d: BitDepth = serde_json::from_str("16").unwrap();
    assert_eq!(d, BitDepth::Sixteen);
    assert!(serde_json::from_str::<BitDepth>("10").is_err());
    let f: PixelFormat = serde_json::from_str("\"gray16le\"").unwrap();
    assert_eq!(f, PixelFormat::Gray16le);
}
