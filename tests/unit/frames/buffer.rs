use super::*;

fn rgb_2x2() -> FrameLayout {
    FrameLayout::new(PixelFormat::Rgb24, Resolution::new(2, 2).unwrap())
}

#[test]
fn frame_buffer_enforces_byte_length() {
    assert!(FrameBuffer::new(rgb_2x2(), vec![0u8; 12]).is_ok());
    let err = FrameBuffer::new(rgb_2x2(), vec![0u8; 11]).unwrap_err();
    assert!(err.to_string().contains("12 bytes"), "{err}");
}

#[test]
fn split_exact_preserves_frame_order() {
    let mut bytes = vec![1u8; 12];
    bytes.extend(vec![2u8; 12]);
    let frames = FrameBuffer::split_exact(rgb_2x2(), &bytes).unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].as_bytes().iter().all(|&b| b == 1));
    assert!(frames[1].as_bytes().iter().all(|&b| b == 2));
}

#[test]
fn split_exact_rejects_partial_frames() {
    assert!(FrameBuffer::split_exact(rgb_2x2(), &[0u8; 13]).is_err());
}
