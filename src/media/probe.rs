use std::path::{Path, PathBuf};

use crate::foundation::core::{FrameRate, Resolution};
use crate::foundation::error::{MoshError, MoshResult};
use crate::media::animation::AnimationMetadata;

/// Container shapes the pipeline dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum MediaShape {
    /// One still image.
    StillImage,
    /// Multi-frame animated image (animated GIF).
    AnimatedImage,
    /// Video, optionally with an audio track.
    Video,
}

/// Immutable snapshot of an input asset's properties.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaDescriptor {
    /// Probed path.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Source pixel format as reported by the prober, if any.
    pub pixel_format: Option<String>,
    /// Frame count; `None` when the container does not report a reliable count.
    pub frame_count: Option<u64>,
    /// Source frame rate; may be `0/0` (reads as 0 Hz).
    pub frame_rate: FrameRate,
    /// Whether an audio stream is present.
    pub has_audio: bool,
    /// Codec of the first audio stream.
    pub audio_codec: Option<String>,
    /// Container format name.
    pub container: String,
    /// Dispatch shape.
    pub shape: MediaShape,
    /// Per-frame timing, present only for multi-frame animated images.
    pub animation: Option<AnimationMetadata>,
}

impl MediaDescriptor {
    /// Source dimensions.
    pub fn resolution(&self) -> MoshResult<Resolution> {
        Resolution::new(self.width, self.height)
    }

    /// Source frame rate in Hz (`0.0` when unknown).
    pub fn frame_rate_hz(&self) -> f64 {
        self.frame_rate.as_f64()
    }

    /// `true` for multi-frame animated images.
    pub fn is_multi_frame_animated(&self) -> bool {
        self.shape == MediaShape::AnimatedImage
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
}

/// Parsed `ffprobe -print_format json -show_streams -show_format` output.
#[derive(serde::Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Demuxers that only ever carry still images.
const IMAGE_CONTAINERS: &[&str] = &["image2", "png_pipe", "apng", "webp_pipe"];

impl ProbeReport {
    /// Parse prober JSON.
    pub fn from_json(bytes: &[u8]) -> MoshResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| MoshError::fatal_input(format!("ffprobe json parse failed: {e}")))
    }

    /// Container format name (first entry of ffprobe's comma-separated list).
    pub fn container(&self) -> &str {
        self.format
            .as_ref()
            .and_then(|f| f.format_name.as_deref())
            .and_then(|n| n.split(',').next())
            .unwrap_or("")
    }

    /// `true` when the container may hold an animation whose timing must be read separately.
    pub fn is_gif(&self) -> bool {
        self.container() == "gif"
    }

    fn is_still_image_container(&self) -> bool {
        let c = self.container();
        IMAGE_CONTAINERS.contains(&c) || c.ends_with("_pipe")
    }

    /// Build the descriptor.
    ///
    /// `animation` is the timing read from a GIF container; more than one frame makes the
    /// asset an animated image, exactly one makes it a still image.
    pub fn into_descriptor(
        self,
        path: &Path,
        animation: Option<&AnimationMetadata>,
    ) -> MoshResult<MediaDescriptor> {
        let container = self.container().to_string();
        let still = self.is_still_image_container();
        let video = self
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                MoshError::fatal_input(format!("no video stream found in '{}'", path.display()))
            })?;
        let width = video
            .width
            .filter(|&w| w > 0)
            .ok_or_else(|| MoshError::fatal_input("missing video width from ffprobe"))?;
        let height = video
            .height
            .filter(|&h| h > 0)
            .ok_or_else(|| MoshError::fatal_input("missing video height from ffprobe"))?;

        let frame_rate = [video.r_frame_rate.as_deref(), video.avg_frame_rate.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(FrameRate::from_ratio)
            .find(|r| r.is_positive())
            .or_else(|| video.r_frame_rate.as_deref().and_then(FrameRate::from_ratio))
            .unwrap_or(FrameRate { num: 0, den: 0 });

        let audio = self
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"));

        let (shape, frame_count) = match animation {
            Some(anim) if anim.frame_count() > 1 => {
                (MediaShape::AnimatedImage, Some(anim.frame_count() as u64))
            }
            Some(_) => (MediaShape::StillImage, Some(1)),
            None if still => (MediaShape::StillImage, Some(1)),
            None => (
                MediaShape::Video,
                video.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok()),
            ),
        };
        let has_audio = shape == MediaShape::Video && audio.is_some();

        Ok(MediaDescriptor {
            path: path.to_path_buf(),
            width,
            height,
            pixel_format: video.pix_fmt.clone(),
            frame_count,
            frame_rate,
            has_audio,
            audio_codec: audio
                .filter(|_| has_audio)
                .and_then(|a| a.codec_name.clone()),
            container,
            shape,
            animation: animation.filter(|a| a.frame_count() > 1).cloned(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
