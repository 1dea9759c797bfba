use super::*;
use crate::codec::pcm::{DEFAULT_SAMPLE_RATE, pixels_to_samples};
use crate::foundation::core::{BitDepth, PixelFormat, Resolution};

fn layout() -> FrameLayout {
    FrameLayout::new(PixelFormat::Rgb24, Resolution::new(2, 1).unwrap())
}

fn frame(bytes: [u8; 6]) -> FrameBuffer {
    FrameBuffer::new(layout(), bytes.to_vec()).unwrap()
}

fn inverted(samples: &SampleBuffer) -> SampleBuffer {
    let out: Vec<u8> = samples.as_bytes().iter().map(|b| 255 - b).collect();
    samples.clone().with_effect_output(out)
}

#[test]
fn blend_factor_rejects_out_of_range_values() {
    assert!(BlendFactor::new(0.0).is_ok());
    assert!(BlendFactor::new(1.0).is_ok());
    assert!(BlendFactor::new(-0.01).is_err());
    assert!(BlendFactor::new(1.5).is_err());
    assert!(BlendFactor::new(f64::NAN).is_err());
    assert!("0.25".parse::<BlendFactor>().is_ok());
    assert!("half".parse::<BlendFactor>().is_err());
}

#[test]
fn blend_zero_yields_original_and_blend_one_yields_reconstruction() {
    let originals = vec![frame([0, 10, 20, 30, 40, 250]), frame([1, 2, 3, 4, 5, 6])];
    let samples = pixels_to_samples(&originals, BitDepth::Eight, DEFAULT_SAMPLE_RATE).unwrap();
    let effected = inverted(&samples);

    let unblended = reassemble(&effected, layout(), &originals, None).unwrap();
    assert_eq!(unblended.blended, 0);

    let zero = reassemble(
        &effected,
        layout(),
        &originals,
        Some(BlendFactor::new(0.0).unwrap()),
    )
    .unwrap();
    assert_eq!(zero.frames, originals);
    assert_eq!(zero.blended, 2);

    let one = reassemble(
        &effected,
        layout(),
        &originals,
        Some(BlendFactor::new(1.0).unwrap()),
    )
    .unwrap();
    assert_eq!(one.frames, unblended.frames);
}

#[test]
fn half_blend_averages_bytes() {
    let a = frame([0, 100, 255, 0, 0, 0]);
    let b = frame([100, 100, 0, 255, 1, 0]);
    let mixed = blend_frames(&a, &b, BlendFactor::new(0.5).unwrap()).unwrap();
    assert_eq!(mixed.as_bytes(), &[50, 100, 128, 128, 1, 0]);
}

#[test]
fn frames_beyond_the_source_count_stay_unblended() {
    let originals = vec![frame([10; 6])];
    let samples = SampleBuffer::from_raw(vec![200u8; 12], BitDepth::Eight, DEFAULT_SAMPLE_RATE);

    let out = reassemble(
        &samples,
        layout(),
        &originals,
        Some(BlendFactor::new(0.5).unwrap()),
    )
    .unwrap();
    assert_eq!(out.frames.len(), 2);
    assert_eq!(out.blended, 1);
    assert_eq!(out.frames[0].as_bytes(), &[105; 6]);
    assert_eq!(out.frames[1].as_bytes(), &[200; 6]);
}

#[test]
fn blend_sequence_stops_at_the_shorter_sequence() {
    let mut frames = vec![frame([100; 6]), frame([100; 6])];
    let originals = [frame([0; 6])];
    let n = blend_sequence(&mut frames, &originals, BlendFactor::new(0.5).unwrap()).unwrap();
    assert_eq!(n, 1);
    assert_eq!(frames[0].as_bytes(), &[50; 6]);
    assert_eq!(frames[1].as_bytes(), &[100; 6]);
}
