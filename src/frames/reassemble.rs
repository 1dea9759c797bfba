use rayon::prelude::*;

use crate::codec::pcm::{SampleBuffer, samples_to_frames};
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::{FrameBuffer, FrameLayout};

/// Weight of the reconstructed frame when mixing it with its source frame.
///
/// `0.0` keeps the source frame untouched, `1.0` keeps the reconstruction untouched.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BlendFactor(f64);

impl BlendFactor {
    /// Build a factor in `[0, 1]`.
    pub fn new(value: f64) -> MoshResult<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(MoshError::usage(format!(
                "blend factor must be within [0, 1], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Factor value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for BlendFactor {
    type Error = MoshError;

    fn try_from(value: f64) -> MoshResult<Self> {
        Self::new(value)
    }
}

impl From<BlendFactor> for f64 {
    fn from(b: BlendFactor) -> Self {
        b.0
    }
}

impl std::str::FromStr for BlendFactor {
    type Err = MoshError;

    fn from_str(s: &str) -> MoshResult<Self> {
        let v = s
            .trim()
            .parse::<f64>()
            .map_err(|_| MoshError::usage(format!("invalid blend factor '{s}'")))?;
        Self::new(v)
    }
}

/// Frames rebuilt from an effected sample stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reassembled {
    /// Output frames in order.
    pub frames: Vec<FrameBuffer>,
    /// Frames that had a source frame to blend with.
    pub blended: usize,
    /// Bytes of a partial final frame that were dropped.
    pub dropped_tail_bytes: usize,
}

/// Map `samples` back to frames of `layout`, optionally blending each with `originals[i]`.
///
/// Frames past the end of `originals` have no blend source and are emitted unblended.
#[tracing::instrument(skip(samples, originals), fields(sample_count = samples.len_samples()))]
pub fn reassemble(
    samples: &SampleBuffer,
    layout: FrameLayout,
    originals: &[FrameBuffer],
    blend: Option<BlendFactor>,
) -> MoshResult<Reassembled> {
    let recon = samples_to_frames(samples, layout)?;
    let mut frames = recon.frames;

    let blended = match blend {
        Some(factor) => blend_sequence(&mut frames, originals, factor)?,
        None => 0,
    };

    Ok(Reassembled {
        frames,
        blended,
        dropped_tail_bytes: recon.dropped_tail_bytes,
    })
}

/// Blend `frames[i]` with `originals[i]` in place for every index both sequences share.
///
/// Returns the number of frames blended; frames past `originals.len()` are left untouched.
pub fn blend_sequence(
    frames: &mut [FrameBuffer],
    originals: &[FrameBuffer],
    factor: BlendFactor,
) -> MoshResult<usize> {
    let n = frames.len().min(originals.len());
    frames[..n]
        .par_iter_mut()
        .zip(&originals[..n])
        .try_for_each(|(frame, original)| -> MoshResult<()> {
            *frame = blend_frames(original, frame, factor)?;
            Ok(())
        })?;
    Ok(n)
}

/// Per-byte weighted mix: `original * (1 - f) + reconstructed * f`, rounded.
///
/// Bytes are mixed independently, which is exact for 8-bit channel formats and deliberately
/// naive for 16-bit ones.
pub fn blend_frames(
    original: &FrameBuffer,
    reconstructed: &FrameBuffer,
    factor: BlendFactor,
) -> MoshResult<FrameBuffer> {
    if original.layout() != reconstructed.layout() {
        return Err(MoshError::validation(
            "blend sources must share a frame layout",
        ));
    }
    let f = factor.value();
    let data = original
        .as_bytes()
        .iter()
        .zip(reconstructed.as_bytes())
        .map(|(&o, &r)| {
            let v = f64::from(o) * (1.0 - f) + f64::from(r) * f;
            v.round().clamp(0.0, 255.0) as u8
        })
        .collect();
    FrameBuffer::new(reconstructed.layout(), data)
}

#[cfg(test)]
#[path = "../../tests/unit/frames/reassemble.rs"]
mod tests;
