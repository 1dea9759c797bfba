//! Output assembler.
//!
//! Chooses the output container from the output path, decides the per-frame timing of
//! animated output and hands encoding to the media toolkit or the in-process GIF writer.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{FrameRate, PixelFormat};
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::FrameBuffer;
use crate::media::animation::AnimationMetadata;
use crate::media::toolkit::{EncodeRequest, EncodeTarget, MediaToolkit};
use crate::output::gif::{frame_to_rgba8, write_animated_gif};

/// Delay used when neither source timing nor a usable frame rate exists.
const FALLBACK_DELAY_CS: u16 = 10;

/// Output container family, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum OutputKind {
    /// Single still image (`png`, `jpg`, `bmp`, `tiff`, `webp`).
    Image,
    /// Animated GIF with explicit per-frame timing.
    AnimatedGif,
    /// Anything else ffmpeg can mux.
    Video,
}

impl OutputKind {
    /// Classify an output path by its extension (case-insensitive).
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "gif" => OutputKind::AnimatedGif,
            "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp" => OutputKind::Image,
            _ => OutputKind::Video,
        }
    }
}

/// Per-frame timing for `frame_count` output frames.
///
/// Source delays and loop count are reused verbatim when the frame count is unchanged.
/// Otherwise every frame gets the same delay: the source's total display time spread over
/// the new count (at least 1 cs), or one frame period at `rate` without source delays.
pub fn plan_timing(
    source: Option<&AnimationMetadata>,
    frame_count: usize,
    rate: FrameRate,
) -> AnimationMetadata {
    if let Some(src) = source
        && src.frame_count() == frame_count
    {
        return src.clone();
    }

    let delay = match source {
        Some(src) if src.total_delay_cs() > 0 && frame_count > 0 => {
            let per = (src.total_delay_cs() as f64 / frame_count as f64).round();
            per.clamp(1.0, f64::from(u16::MAX)) as u16
        }
        _ if rate.is_positive() => {
            let per = (100.0 / rate.as_f64()).round();
            per.clamp(1.0, f64::from(u16::MAX)) as u16
        }
        _ => FALLBACK_DELAY_CS,
    };
    if let Some(src) = source {
        tracing::info!(
            source_frames = src.frame_count(),
            output_frames = frame_count,
            delay_cs = delay,
            "frame count changed, using uniform delay"
        );
    }

    AnimationMetadata {
        delays_cs: vec![delay; frame_count],
        loop_count: source.map_or(Some(0), |s| s.loop_count),
    }
}

/// Everything the assembler needs for one output file.
#[derive(Debug)]
pub struct AssembleRequest<'a> {
    /// Final frames in display order.
    pub frames: Vec<FrameBuffer>,
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Source timing of an animated input.
    pub animation: Option<&'a AnimationMetadata>,
    /// Processed audio track to mux into video output.
    pub audio: Option<&'a Path>,
    /// Container to produce.
    pub kind: OutputKind,
    /// File to write.
    pub output: &'a Path,
    /// Run-scoped working directory.
    pub workdir: &'a Path,
}

/// What was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledOutput {
    /// Container produced.
    pub kind: OutputKind,
    /// Frames encoded.
    pub frames_written: usize,
    /// Timing written into animated output.
    pub animation: Option<AnimationMetadata>,
}

/// Encode the final frames.
#[tracing::instrument(
    skip(toolkit, req),
    fields(kind = ?req.kind, frame_count = req.frames.len(), output = %req.output.display())
)]
pub fn assemble(
    toolkit: &dyn MediaToolkit,
    req: AssembleRequest<'_>,
) -> MoshResult<AssembledOutput> {
    let Some(first) = req.frames.first() else {
        return Err(MoshError::validation("no frames left to encode"));
    };
    let layout = first.layout();

    match req.kind {
        OutputKind::AnimatedGif => {
            if req.audio.is_some() {
                tracing::warn!("gif output has no audio track, processed audio is discarded");
            }
            let timing = plan_timing(req.animation, req.frames.len(), req.frame_rate);
            let rgba = to_rgba_frames(toolkit, req.frames, req.workdir)?;
            let frames_written = rgba.len();
            write_animated_gif(req.output, layout.width, layout.height, rgba, &timing)?;
            Ok(AssembledOutput {
                kind: req.kind,
                frames_written,
                animation: Some(timing),
            })
        }
        OutputKind::Image => {
            if req.frames.len() > 1 {
                tracing::info!(
                    dropped = req.frames.len() - 1,
                    "still image output keeps the first frame"
                );
            }
            toolkit.encode(&EncodeRequest {
                frames: &req.frames[..1],
                layout,
                frame_rate: req.frame_rate,
                target: EncodeTarget::Image,
                output: req.output,
                workdir: req.workdir,
            })?;
            Ok(AssembledOutput {
                kind: req.kind,
                frames_written: 1,
                animation: None,
            })
        }
        OutputKind::Video => {
            toolkit.encode(&EncodeRequest {
                frames: &req.frames,
                layout,
                frame_rate: req.frame_rate,
                target: EncodeTarget::Video { audio: req.audio },
                output: req.output,
                workdir: req.workdir,
            })?;
            Ok(AssembledOutput {
                kind: req.kind,
                frames_written: req.frames.len(),
                animation: None,
            })
        }
    }
}

fn to_rgba_frames(
    toolkit: &dyn MediaToolkit,
    frames: Vec<FrameBuffer>,
    workdir: &Path,
) -> MoshResult<Vec<Vec<u8>>> {
    if let Some(direct) = frames.iter().map(frame_to_rgba8).collect::<Option<Vec<_>>>() {
        return Ok(direct);
    }
    Ok(toolkit
        .convert_frames(&frames, PixelFormat::Rgba, workdir)?
        .into_iter()
        .map(FrameBuffer::into_bytes)
        .collect())
}

fn ensure_parent_dir(path: &Path) -> MoshResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Move a finished output from working storage to its destination.
///
/// Falls back to copying when the two paths are on different filesystems.
pub fn publish(staged: &Path, output: &Path) -> MoshResult<()> {
    ensure_parent_dir(output)?;
    if std::fs::rename(staged, output).is_err() {
        std::fs::copy(staged, output).with_context(|| {
            format!(
                "failed to move '{}' to '{}'",
                staged.display(),
                output.display()
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/output/assemble.rs"]
mod tests;
