use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::PixelFormat;
use crate::foundation::error::{MoshError, MoshResult};
use crate::foundation::invocation::{Invocation, is_tool_on_path};
use crate::frames::buffer::{FrameBuffer, FrameLayout};
use crate::media::animation::read_gif_animation;
use crate::media::probe::{MediaDescriptor, ProbeReport};
use crate::media::toolkit::{
    EncodeRequest, EncodeTarget, ExtractRequest, ExtractedFrames, MediaToolkit,
};

/// [`MediaToolkit`] backed by the system `ffmpeg` and `ffprobe` binaries.
///
/// Frames cross the process boundary as headerless `rawvideo` files in the run's working
/// directory.
#[derive(Clone, Debug)]
pub struct FfmpegToolkit {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl FfmpegToolkit {
    /// Use specific `ffmpeg` and `ffprobe` executables.
    pub fn with_programs(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn ffmpeg(&self) -> Invocation {
        Invocation::new(&self.ffmpeg).args(["-v", "error", "-y"])
    }

    /// `ffprobe` call describing `path` as JSON.
    pub fn probe_invocation(&self, path: &Path) -> Invocation {
        Invocation::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .path(path)
    }

    /// Decode every video frame of `input` to raw `layout` frames in `output`.
    pub fn extract_invocation(
        &self,
        input: &Path,
        layout: FrameLayout,
        output: &Path,
    ) -> Invocation {
        self.ffmpeg()
            .arg("-i")
            .path(input)
            .args(["-map", "0:v:0", "-fps_mode", "passthrough", "-f", "rawvideo"])
            .arg("-pix_fmt")
            .arg(layout.format.ffmpeg_name())
            .arg("-s")
            .arg(layout.resolution().to_string())
            .path(output)
    }

    /// Extract the first audio track of `input` as 16-bit PCM WAV.
    pub fn audio_invocation(&self, input: &Path, output: &Path) -> Invocation {
        self.ffmpeg()
            .arg("-i")
            .path(input)
            .args(["-map", "0:a:0", "-vn", "-acodec", "pcm_s16le"])
            .path(output)
    }

    /// Re-encode raw `from` frames in `input` as raw `to` frames in `output`.
    pub fn convert_invocation(
        &self,
        from: FrameLayout,
        to: PixelFormat,
        input: &Path,
        output: &Path,
    ) -> Invocation {
        raw_input(self.ffmpeg(), from, None, input)
            .args(["-f", "rawvideo", "-pix_fmt"])
            .arg(to.ffmpeg_name())
            .path(output)
    }

    /// Encode the raw frames in `raw` as `req.target` into `req.output`.
    pub fn encode_invocation(&self, req: &EncodeRequest<'_>, raw: &Path) -> Invocation {
        let inv = raw_input(
            self.ffmpeg(),
            req.layout,
            Some(req.frame_rate.to_string()),
            raw,
        );
        let inv = match req.target {
            EncodeTarget::Image => inv.args(["-frames:v", "1", "-update", "1"]),
            EncodeTarget::Video { audio: Some(audio) } => inv
                .arg("-i")
                .path(audio)
                .args(["-map", "0:v:0", "-map", "1:a:0", "-shortest"]),
            EncodeTarget::Video { audio: None } => inv.args(["-map", "0:v:0", "-an"]),
        };
        inv.path(req.output)
    }
}

fn raw_input(
    inv: Invocation,
    layout: FrameLayout,
    rate: Option<String>,
    input: &Path,
) -> Invocation {
    let inv = inv
        .args(["-f", "rawvideo", "-pix_fmt"])
        .arg(layout.format.ffmpeg_name())
        .arg("-s")
        .arg(layout.resolution().to_string());
    let inv = match rate {
        Some(rate) => inv.arg("-r").arg(rate),
        None => inv,
    };
    inv.arg("-i").path(input)
}

fn write_raw_frames(path: &Path, frames: &[FrameBuffer]) -> MoshResult<()> {
    let mut bytes = Vec::with_capacity(frames.iter().map(|f| f.as_bytes().len()).sum());
    for frame in frames {
        bytes.extend_from_slice(frame.as_bytes());
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("write raw frames '{}'", path.display()))?;
    Ok(())
}

fn read_raw_frames(path: &Path, layout: FrameLayout) -> MoshResult<Vec<FrameBuffer>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read raw frames '{}'", path.display()))?;
    let frames = FrameBuffer::split_exact(layout, &bytes)?;
    let _ = std::fs::remove_file(path);
    Ok(frames)
}

impl MediaToolkit for FfmpegToolkit {
    fn name(&self) -> &str {
        &self.ffmpeg
    }

    fn check_available(&self) -> MoshResult<()> {
        for program in [&self.ffmpeg, &self.ffprobe] {
            if !is_tool_on_path(program, "-version") {
                return Err(MoshError::missing_dependency(format!(
                    "'{program}' is required for media decode/encode, but was not found on PATH"
                )));
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn probe(&self, path: &Path) -> MoshResult<MediaDescriptor> {
        let out = self.probe_invocation(path).run().map_err(|e| match e {
            MoshError::Collaborator {
                invocation,
                diagnostics,
                ..
            } => MoshError::fatal_input(format!(
                "'{}' could not be probed ({invocation}):\n{diagnostics}",
                path.display()
            )),
            other => other,
        })?;

        let report = ProbeReport::from_json(&out.stdout)?;
        let animation = if report.is_gif() {
            Some(read_gif_animation(path)?)
        } else {
            None
        };
        report.into_descriptor(path, animation.as_ref())
    }

    #[tracing::instrument(skip(self, req), fields(input = %req.media.path.display()))]
    fn extract_frames(&self, req: &ExtractRequest<'_>) -> MoshResult<ExtractedFrames> {
        let raw = req.workdir.join("source_frames.raw");
        self.extract_invocation(&req.media.path, req.layout, &raw).run()?;
        let frames = read_raw_frames(&raw, req.layout)?;
        if frames.is_empty() {
            return Err(MoshError::fatal_input(format!(
                "'{}' decoded to zero frames",
                req.media.path.display()
            )));
        }

        let animation = req.media.animation.clone().map(|anim| {
            if anim.frame_count() != frames.len() {
                tracing::warn!(
                    timing = anim.frame_count(),
                    decoded = frames.len(),
                    "animation timing does not match decoded frame count"
                );
            }
            anim.aligned_to(frames.len())
        });
        tracing::info!(frames = frames.len(), layout = ?req.layout, "frames extracted");
        Ok(ExtractedFrames { frames, animation })
    }

    #[tracing::instrument(skip(self, media), fields(input = %media.path.display()))]
    fn extract_audio(&self, media: &MediaDescriptor, workdir: &Path) -> MoshResult<PathBuf> {
        let wav = workdir.join("source_audio.wav");
        self.audio_invocation(&media.path, &wav).run()?;
        Ok(wav)
    }

    #[tracing::instrument(skip(self, frames), fields(frame_count = frames.len()))]
    fn convert_frames(
        &self,
        frames: &[FrameBuffer],
        target: PixelFormat,
        workdir: &Path,
    ) -> MoshResult<Vec<FrameBuffer>> {
        let Some(first) = frames.first() else {
            return Ok(Vec::new());
        };
        let from = first.layout();
        let to = FrameLayout { format: target, ..from };

        let input = workdir.join("convert.in.raw");
        let output = workdir.join("convert.out.raw");
        write_raw_frames(&input, frames)?;
        self.convert_invocation(from, target, &input, &output).run()?;
        let _ = std::fs::remove_file(&input);
        read_raw_frames(&output, to)
    }

    #[tracing::instrument(
        skip(self, req),
        fields(frames = req.frames.len(), output = %req.output.display())
    )]
    fn encode(&self, req: &EncodeRequest<'_>) -> MoshResult<()> {
        if req.frames.is_empty() {
            return Err(MoshError::validation("cannot encode an empty frame sequence"));
        }
        let raw = req.workdir.join("encode.raw");
        write_raw_frames(&raw, req.frames)?;
        self.encode_invocation(req, &raw).run()?;
        let _ = std::fs::remove_file(&raw);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
