use std::{fs::File, io::BufWriter, path::Path};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::foundation::core::PixelFormat;
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::FrameBuffer;
use crate::media::animation::AnimationMetadata;

/// Convert a frame to straight RGBA8 in-process, when its format is a plain 8-bit layout.
///
/// Returns `None` for formats that need a real colour conversion (YUV, 16-bit).
pub fn frame_to_rgba8(frame: &FrameBuffer) -> Option<Vec<u8>> {
    let src = frame.as_bytes();
    let px = |order: [usize; 4], stride: usize| -> Vec<u8> {
        let mut out = Vec::with_capacity(src.len() / stride * 4);
        for p in src.chunks_exact(stride) {
            for &i in &order {
                out.push(if i < stride { p[i] } else { 255 });
            }
        }
        out
    };
    match frame.layout().format {
        PixelFormat::Rgba => Some(src.to_vec()),
        PixelFormat::Rgb24 => Some(px([0, 1, 2, 3], 3)),
        PixelFormat::Bgr24 => Some(px([2, 1, 0, 3], 3)),
        PixelFormat::Bgra => Some(px([2, 1, 0, 3], 4)),
        PixelFormat::Argb => Some(px([1, 2, 3, 0], 4)),
        PixelFormat::Abgr => Some(px([3, 2, 1, 0], 4)),
        PixelFormat::Gray => Some(px([0, 0, 0, 1], 1)),
        _ => None,
    }
}

/// Write RGBA frames as an animated GIF with explicit per-frame timing.
#[tracing::instrument(skip(frames, timing), fields(frame_count = frames.len()))]
pub fn write_animated_gif(
    path: &Path,
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
    timing: &AnimationMetadata,
) -> MoshResult<()> {
    if frames.len() != timing.frame_count() {
        return Err(MoshError::validation(format!(
            "gif timing covers {} frames but {} were supplied",
            timing.frame_count(),
            frames.len()
        )));
    }

    let file =
        File::create(path).with_context(|| format!("create gif '{}'", path.display()))?;
    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), 10);
    if let Some(loops) = timing.loop_count {
        let repeat = if loops == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(loops)
        };
        encoder
            .set_repeat(repeat)
            .with_context(|| format!("write gif loop count '{}'", path.display()))?;
    }

    for (data, &cs) in frames.into_iter().zip(&timing.delays_cs) {
        let img = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            MoshError::validation(format!("rgba frame does not match {width}x{height}"))
        })?;
        let delay = Delay::from_numer_denom_ms(u32::from(cs) * 10, 1);
        encoder
            .encode_frame(Frame::from_parts(img, 0, 0, delay))
            .with_context(|| format!("encode gif frame '{}'", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/output/gif.rs"]
mod tests;
