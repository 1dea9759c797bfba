//! audiomosh datamoshes images and video by running their pixels through audio effects.
//!
//! The raw pixel bytes of every frame are reinterpreted as unsigned PCM samples, pushed
//! through an ordered chain of audio effects, and reinterpreted back as pixels. A genuine
//! audio track, when present, gets the identical effect chain so picture and sound are
//! distorted by "the same effect".
//!
//! # Pipeline overview
//!
//! 1. **Probe**: input path -> [`MediaDescriptor`] (still image, animated image or video)
//! 2. **Extract**: decode frames to raw [`FrameBuffer`]s in the configured pixel format
//! 3. **Encode**: frames -> [`SampleBuffer`] (byte reinterpretation, zero-padded)
//! 4. **Effect**: run the [`EffectSpec`] over the sample stream (and the audio track)
//! 5. **Decode**: samples -> whole frames (`floor(len / frame_bytes)`)
//! 6. **Reassemble**: optionally blend each frame with its source frame
//! 7. **Mux**: encode the output container, keeping or regenerating GIF timing
//!
//! External tools (ffmpeg, ffprobe, sox) sit behind the [`MediaToolkit`] and
//! [`EffectProcessor`] traits and are always invoked through a structured [`Invocation`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec {
    pub mod pcm;
}
mod effects {
    pub mod chain;
    pub mod runner;
    pub mod sox;
}
mod foundation {
    pub mod core;
    pub mod error;
    pub mod invocation;
}
mod frames {
    pub mod buffer;
    pub mod reassemble;
}
mod media {
    pub mod animation;
    pub mod ffmpeg;
    pub mod probe;
    pub mod toolkit;
}
mod output {
    pub mod assemble;
    pub mod gif;
}
mod pipeline {
    pub mod config;
    pub mod orchestrator;
    pub mod workdir;
}

pub use codec::pcm::{
    DEFAULT_SAMPLE_RATE, Reconstruction, SampleBuffer, pixels_to_samples, samples_to_frames,
};
pub use effects::chain::{
    EXAMPLE_EFFECTS, Effect, EffectSpec, SOX_EFFECTS, effects_catalog, is_known_effect,
};
pub use effects::runner::{AudioStream, EffectChainRunner, EffectJob, EffectProcessor};
pub use effects::sox::SoxProcessor;
pub use foundation::core::{BitDepth, FrameRate, PixelFormat, Resolution};
pub use foundation::error::{MoshError, MoshResult};
pub use foundation::invocation::{Arg, Invocation, is_tool_on_path};
pub use frames::buffer::{FrameBuffer, FrameLayout};
pub use frames::reassemble::{
    BlendFactor, Reassembled, blend_frames, blend_sequence, reassemble,
};
pub use media::animation::{AnimationMetadata, read_gif_animation};
pub use media::ffmpeg::FfmpegToolkit;
pub use media::probe::{MediaDescriptor, MediaShape, ProbeReport};
pub use media::toolkit::{
    EncodeRequest, EncodeTarget, ExtractRequest, ExtractedFrames, MediaToolkit,
};
pub use output::assemble::{
    AssembleRequest, AssembledOutput, OutputKind, assemble, plan_timing, publish,
};
pub use output::gif::{frame_to_rgba8, write_animated_gif};
pub use pipeline::config::{ConfigOverrides, FALLBACK_FRAME_RATE, PipelineConfig};
pub use pipeline::orchestrator::{CancelFlag, Pipeline, RunReport, Stage};
pub use pipeline::workdir::WorkDir;
