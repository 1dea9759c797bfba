use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::foundation::error::{MoshError, MoshResult};

/// Timing of a multi-frame animated image.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnimationMetadata {
    /// Per-frame display delay in centiseconds, in frame order.
    pub delays_cs: Vec<u16>,
    /// GIF loop count; `Some(0)` loops forever, `None` means the file carries no loop
    /// extension and plays once.
    pub loop_count: Option<u16>,
}

impl AnimationMetadata {
    /// Number of frames the timing describes.
    pub fn frame_count(&self) -> usize {
        self.delays_cs.len()
    }

    /// Sum of all frame delays in centiseconds.
    pub fn total_delay_cs(&self) -> u64 {
        self.delays_cs.iter().map(|&d| u64::from(d)).sum()
    }

    /// Resize the delay list to `frames` entries, repeating the last delay when growing.
    pub fn aligned_to(mut self, frames: usize) -> Self {
        let last = self.delays_cs.last().copied().unwrap_or(0);
        self.delays_cs.resize(frames, last);
        self
    }
}

/// Read per-frame delays and loop count of a GIF file.
///
/// Walks the block structure once with indexed output, so frames are never expanded to RGBA.
#[tracing::instrument]
pub fn read_gif_animation(path: &Path) -> MoshResult<AnimationMetadata> {
    let file =
        File::open(path).with_context(|| format!("open animated image '{}'", path.display()))?;
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(BufReader::new(file)).map_err(|e| {
        MoshError::fatal_input(format!("decode gif '{}': {e}", path.display()))
    })?;

    let mut delays_cs = Vec::new();
    while let Some(frame) = decoder.read_next_frame().map_err(|e| {
        MoshError::fatal_input(format!("decode gif frames '{}': {e}", path.display()))
    })? {
        delays_cs.push(frame.delay);
    }

    // The decoder reports a missing loop extension as `Finite(0)`.
    let loop_count = match decoder.repeat() {
        gif::Repeat::Infinite => Some(0),
        gif::Repeat::Finite(0) => None,
        gif::Repeat::Finite(n) => Some(n),
    };
    Ok(AnimationMetadata {
        delays_cs,
        loop_count,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/animation.rs"]
mod tests;
