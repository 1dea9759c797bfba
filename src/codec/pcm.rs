//! Pixel⇄sample codec.
//!
//! The mapping is a byte reinterpretation, not a conversion: frame bytes are concatenated in
//! frame order and read as unsigned little-endian mono PCM samples of the configured width.
//! No sample value is ever resampled, scaled or clipped.

use crate::foundation::core::BitDepth;
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::{FrameBuffer, FrameLayout};

/// Sample rate the raw stream is labelled with when handed to the effect chain.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Flat mono stream of unsigned samples, the pivot between pixel and audio domains.
///
/// Invariant: `bytes.len()` is a multiple of `bit_depth.bytes()`; bytes past `unpadded_len`
/// are zero padding added by [`pixels_to_samples`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBuffer {
    bytes: Vec<u8>,
    bit_depth: BitDepth,
    sample_rate: u32,
    unpadded_len: usize,
}

impl SampleBuffer {
    /// Wrap raw sample bytes, zero-padding to a whole number of samples.
    pub fn from_raw(mut bytes: Vec<u8>, bit_depth: BitDepth, sample_rate: u32) -> Self {
        let unpadded_len = bytes.len();
        let width = bit_depth.bytes();
        bytes.resize(unpadded_len.div_ceil(width) * width, 0);
        Self {
            bytes,
            bit_depth,
            sample_rate,
            unpadded_len,
        }
    }

    /// Build a buffer from sample values; each value is truncated to the sample width.
    pub fn from_samples(
        samples: impl IntoIterator<Item = u32>,
        bit_depth: BitDepth,
        sample_rate: u32,
    ) -> Self {
        let width = bit_depth.bytes();
        let mut bytes = Vec::new();
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes()[..width]);
        }
        Self::from_raw(bytes, bit_depth, sample_rate)
    }

    /// Replace the stream with an effect chain's output.
    ///
    /// The padding record survives only when the length is unchanged; any other length means
    /// the effect rewrote the stream and every byte is treated as data.
    pub fn with_effect_output(self, bytes: Vec<u8>) -> Self {
        let unpadded_len = if bytes.len() == self.bytes.len() {
            self.unpadded_len
        } else {
            bytes.len()
        };
        let mut out = Self::from_raw(bytes, self.bit_depth, self.sample_rate);
        out.unpadded_len = unpadded_len.min(out.unpadded_len);
        out
    }

    /// Sample bytes including padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sample bytes without the trailing padding.
    pub fn pixel_bytes(&self) -> &[u8] {
        &self.bytes[..self.unpadded_len]
    }

    /// Byte length before padding.
    pub fn unpadded_len(&self) -> usize {
        self.unpadded_len
    }

    /// Number of padding bytes appended to complete the final sample.
    pub fn padding(&self) -> usize {
        self.bytes.len() - self.unpadded_len
    }

    /// Number of samples.
    pub fn len_samples(&self) -> usize {
        self.bytes.len() / self.bit_depth.bytes()
    }

    /// `true` when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sample width.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Sample rate label in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Decode sample values (unsigned, little-endian).
    pub fn samples(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .chunks_exact(self.bit_depth.bytes())
            .map(|chunk| {
                chunk
                    .iter()
                    .rev()
                    .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
            })
    }
}

/// Forward mapping: concatenate frames in order and reinterpret the bytes as samples.
pub fn pixels_to_samples(
    frames: &[FrameBuffer],
    bit_depth: BitDepth,
    sample_rate: u32,
) -> MoshResult<SampleBuffer> {
    let Some(first) = frames.first() else {
        return Err(MoshError::validation("cannot encode an empty frame sequence"));
    };
    let layout = first.layout();
    if let Some(idx) = frames.iter().position(|f| f.layout() != layout) {
        return Err(MoshError::validation(format!(
            "frame {idx} layout differs from frame 0"
        )));
    }

    let mut bytes = Vec::with_capacity(layout.frame_bytes() * frames.len() + 2);
    for frame in frames {
        bytes.extend_from_slice(frame.as_bytes());
    }
    Ok(SampleBuffer::from_raw(bytes, bit_depth, sample_rate))
}

/// Result of the inverse mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconstruction {
    /// Whole frames recovered, in order.
    pub frames: Vec<FrameBuffer>,
    /// Trailing bytes that did not fill a whole frame and were dropped.
    pub dropped_tail_bytes: usize,
}

/// Inverse mapping: cut the unpadded sample bytes into whole frames of `layout`.
///
/// The frame count is `floor(len / frame_bytes)`: a longer stream yields extra trailing
/// frames, a shorter one yields fewer frames, and a partial final frame is never emitted.
pub fn samples_to_frames(
    samples: &SampleBuffer,
    layout: FrameLayout,
) -> MoshResult<Reconstruction> {
    let frame_bytes = layout.frame_bytes();
    if frame_bytes == 0 {
        return Err(MoshError::validation("frame layout has zero byte size"));
    }

    let bytes = samples.pixel_bytes();
    let whole = bytes.len() / frame_bytes;
    let frames = bytes
        .chunks_exact(frame_bytes)
        .map(|chunk| FrameBuffer::new(layout, chunk.to_vec()))
        .collect::<MoshResult<Vec<_>>>()?;
    debug_assert_eq!(frames.len(), whole);

    Ok(Reconstruction {
        frames,
        dropped_tail_bytes: bytes.len() - whole * frame_bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/pcm.rs"]
mod tests;
