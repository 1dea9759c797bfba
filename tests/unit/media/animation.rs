use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};

use super::*;

fn write_gif(path: &Path, delays_cs: &[u32], repeat: Option<Repeat>) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    if let Some(repeat) = repeat {
        encoder.set_repeat(repeat).unwrap();
    }
    for (i, &cs) in delays_cs.iter().enumerate() {
        let shade = (i * 60) as u8;
        let img = RgbaImage::from_pixel(2, 2, Rgba([shade, 0, 255 - shade, 255]));
        let delay = Delay::from_numer_denom_ms(cs * 10, 1);
        encoder
            .encode_frame(Frame::from_parts(img, 0, 0, delay))
            .unwrap();
    }
}

#[test]
fn reads_delays_and_infinite_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.gif");
    write_gif(&path, &[10, 20, 30], Some(Repeat::Infinite));

    let meta = read_gif_animation(&path).unwrap();
    assert_eq!(meta.delays_cs, vec![10, 20, 30]);
    assert_eq!(meta.loop_count, Some(0));
    assert_eq!(meta.frame_count(), 3);
    assert_eq!(meta.total_delay_cs(), 60);
}

#[test]
fn finite_loop_count_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.gif");
    write_gif(&path, &[5, 5], Some(Repeat::Finite(3)));
    assert_eq!(read_gif_animation(&path).unwrap().loop_count, Some(3));
}

#[test]
fn gif_without_loop_extension_plays_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("once.gif");
    write_gif(&path, &[8, 8], None);
    assert_eq!(read_gif_animation(&path).unwrap().loop_count, None);
}

#[test]
fn loop_extension_bytes_inside_a_comment_are_not_a_loop_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commented.gif");
    write_gif(&path, &[10, 20], None);

    let mut text = vec![0x21, 0xFF, 0x0B];
    text.extend(b"NETSCAPE2.0");
    text.extend([0x03, 0x01, 0x05, 0x00]);
    let mut comment = vec![0x21, 0xFE, text.len() as u8];
    comment.extend(&text);
    comment.push(0x00);

    let mut bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.pop(), Some(0x3B));
    bytes.extend(comment);
    bytes.push(0x3B);
    std::fs::write(&path, bytes).unwrap();

    let meta = read_gif_animation(&path).unwrap();
    assert_eq!(meta.delays_cs, vec![10, 20]);
    assert_eq!(meta.loop_count, None);
}

#[test]
fn unreadable_gif_is_a_fatal_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.gif");
    std::fs::write(&path, b"not a gif").unwrap();
    assert!(matches!(
        read_gif_animation(&path).unwrap_err(),
        MoshError::FatalInput(_)
    ));
}

#[test]
fn aligned_to_pads_with_the_last_delay() {
    let meta = AnimationMetadata {
        delays_cs: vec![4, 7],
        loop_count: None,
    };
    assert_eq!(meta.clone().aligned_to(4).delays_cs, vec![4, 7, 7, 7]);
    assert_eq!(meta.aligned_to(1).delays_cs, vec![4]);
}
