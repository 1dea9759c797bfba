use std::path::{Path, PathBuf};

use crate::foundation::core::{FrameRate, PixelFormat};
use crate::foundation::error::MoshResult;
use crate::frames::buffer::{FrameBuffer, FrameLayout};
use crate::media::animation::AnimationMetadata;
use crate::media::probe::MediaDescriptor;

/// What to decode and where intermediate files may go.
#[derive(Clone, Copy, Debug)]
pub struct ExtractRequest<'a> {
    /// Probed input.
    pub media: &'a MediaDescriptor,
    /// Target pixel format and resolution of every decoded frame.
    pub layout: FrameLayout,
    /// Run-scoped working directory.
    pub workdir: &'a Path,
}

/// Decoded frames in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedFrames {
    /// One buffer per source frame.
    pub frames: Vec<FrameBuffer>,
    /// Timing aligned to `frames`, for animated images.
    pub animation: Option<AnimationMetadata>,
}

/// Container an encode produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeTarget<'a> {
    /// One still image from the first frame.
    Image,
    /// A video, muxed with an audio file when one is given.
    Video {
        /// Processed audio track.
        audio: Option<&'a Path>,
    },
}

/// Frames to encode into `output`.
#[derive(Clone, Copy, Debug)]
pub struct EncodeRequest<'a> {
    /// Frames in display order, all in `layout`.
    pub frames: &'a [FrameBuffer],
    /// Pixel format and dimensions of `frames`.
    pub layout: FrameLayout,
    /// Display rate.
    pub frame_rate: FrameRate,
    /// Output container.
    pub target: EncodeTarget<'a>,
    /// File to write.
    pub output: &'a Path,
    /// Run-scoped working directory.
    pub workdir: &'a Path,
}

/// Media collaborator: probing, decoding and encoding.
///
/// Implementations own codec and container details; callers only ever see raw frames.
pub trait MediaToolkit: Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Fail with a missing-dependency error when the collaborator cannot run.
    fn check_available(&self) -> MoshResult<()>;

    /// Describe the asset at `path`.
    fn probe(&self, path: &Path) -> MoshResult<MediaDescriptor>;

    /// Decode every frame of the asset.
    fn extract_frames(&self, req: &ExtractRequest<'_>) -> MoshResult<ExtractedFrames>;

    /// Extract the first audio track as a WAV file inside `workdir`.
    fn extract_audio(&self, media: &MediaDescriptor, workdir: &Path) -> MoshResult<PathBuf>;

    /// Convert frames to another pixel format at the same resolution.
    fn convert_frames(
        &self,
        frames: &[FrameBuffer],
        target: PixelFormat,
        workdir: &Path,
    ) -> MoshResult<Vec<FrameBuffer>>;

    /// Encode frames into a still image or a video.
    fn encode(&self, req: &EncodeRequest<'_>) -> MoshResult<()>;
}
