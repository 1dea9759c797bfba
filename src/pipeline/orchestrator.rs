//! Pipeline orchestrator.
//!
//! A run walks `Init → Probing → Extracting → Encoding → Effecting → Decoding →
//! Reassembling → MuxingOutput → Done`; any error ends it in `Failed`. After `Extracting`
//! the run branches on the probed [`MediaShape`]:
//!
//! - multi-frame animated images go frame by frame: every frame is its own sample stream,
//!   effected independently on a rayon pool, and yields at most one output frame;
//! - still images and videos go through the codec path: all frames become one sample stream,
//!   and a genuine audio track, when present, gets the identical effect chain.
//!
//! Working storage lives in a [`WorkDir`] owned by the run, so it is released exactly once
//! on success, failure and cancellation alike. The output is written inside it and only
//! moved into place after every stage succeeded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::codec::pcm::{SampleBuffer, pixels_to_samples, samples_to_frames};
use crate::effects::runner::{EffectChainRunner, EffectProcessor};
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::{FrameBuffer, FrameLayout};
use crate::frames::reassemble::{blend_frames, blend_sequence};
use crate::media::animation::AnimationMetadata;
use crate::media::probe::{MediaDescriptor, MediaShape};
use crate::media::toolkit::{ExtractRequest, MediaToolkit};
use crate::output::assemble::{AssembleRequest, OutputKind, assemble, publish};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::workdir::WorkDir;

/// Orchestrator states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Stage {
    /// Input check, dependency gate and working storage.
    Init,
    /// Media introspection.
    Probing,
    /// Frame (and animation timing) extraction.
    Extracting,
    /// Pixels to samples.
    Encoding,
    /// Effect chain over the pixel stream and the audio track.
    Effecting,
    /// Samples to pixels.
    Decoding,
    /// Blending and frame-count policy.
    Reassembling,
    /// Output encoding and publishing.
    MuxingOutput,
    /// Finished; working storage released.
    Done,
    /// Terminal state after any error.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Probing => "probing",
            Stage::Extracting => "extracting",
            Stage::Encoding => "encoding",
            Stage::Effecting => "effecting",
            Stage::Decoding => "decoding",
            Stage::Reassembling => "reassembling",
            Stage::MuxingOutput => "muxing-output",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Interrupt flag shared with a signal handler.
///
/// Checked only at stage boundaries; a running collaborator call is never interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Flag that is not yet set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelFlag::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct StageTracker<'a> {
    cancel: &'a CancelFlag,
    visited: Vec<Stage>,
}

impl<'a> StageTracker<'a> {
    fn new(cancel: &'a CancelFlag) -> Self {
        Self {
            cancel,
            visited: Vec::new(),
        }
    }

    fn enter(&mut self, stage: Stage) -> MoshResult<()> {
        if self.cancel.is_cancelled() {
            return Err(MoshError::cancelled(format!("interrupted before {stage}")));
        }
        tracing::info!(%stage, "stage");
        self.visited.push(stage);
        Ok(())
    }

    fn current(&self) -> Stage {
        self.visited.last().copied().unwrap_or(Stage::Init)
    }
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Probed input shape.
    pub shape: MediaShape,
    /// Output container.
    pub output_kind: OutputKind,
    /// Frames decoded from the input.
    pub frames_in: usize,
    /// Frames encoded into the output.
    pub frames_out: usize,
    /// Whether a genuine audio track went through the effect chain.
    pub audio_processed: bool,
    /// Timing written into animated output.
    pub animation: Option<AnimationMetadata>,
    /// Stages visited, in order, ending with [`Stage::Done`].
    pub stages: Vec<Stage>,
}

/// Frames and processed audio produced by either branch.
struct Processed {
    frames: Vec<FrameBuffer>,
    audio: Option<PathBuf>,
}

/// One configured pipeline. Collaborators are borrowed so tests can substitute fakes.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    media: &'a dyn MediaToolkit,
    effects: &'a dyn EffectProcessor,
    cancel: CancelFlag,
}

impl<'a> Pipeline<'a> {
    /// Pipeline over `config` using the given media and effect collaborators.
    pub fn new(
        config: &'a PipelineConfig,
        media: &'a dyn MediaToolkit,
        effects: &'a dyn EffectProcessor,
    ) -> Self {
        Self {
            config,
            media,
            effects,
            cancel: CancelFlag::default(),
        }
    }

    /// Honor `cancel` at every stage boundary.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fail unless every collaborator can run.
    pub fn check_dependencies(&self) -> MoshResult<()> {
        self.effects.check_available()?;
        self.media.check_available()
    }

    /// Run the whole pipeline from `input` to `output`.
    ///
    /// On any error the output path is left untouched and working storage is removed.
    #[tracing::instrument(
        skip(self),
        fields(input = %input.display(), output = %output.display())
    )]
    pub fn run(&self, input: &Path, output: &Path) -> MoshResult<RunReport> {
        let mut tracker = StageTracker::new(&self.cancel);
        match self.run_stages(&mut tracker, input, output) {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!(
                    stage = %tracker.current(),
                    next = %Stage::Failed,
                    "run failed"
                );
                Err(err)
            }
        }
    }

    fn run_stages(
        &self,
        tracker: &mut StageTracker<'_>,
        input: &Path,
        output: &Path,
    ) -> MoshResult<RunReport> {
        tracker.enter(Stage::Init)?;
        self.config.validate()?;
        if !input.is_file() {
            return Err(MoshError::fatal_input(format!(
                "input '{}' does not exist or is not a file",
                input.display()
            )));
        }
        self.check_dependencies()?;
        let workdir = WorkDir::create(self.config.work_root.as_deref())?;
        let pool = build_thread_pool(self.config.threads)?;

        tracker.enter(Stage::Probing)?;
        let media = self.media.probe(input)?;
        tracing::info!(
            shape = ?media.shape,
            width = media.width,
            height = media.height,
            frames = ?media.frame_count,
            fps = media.frame_rate_hz(),
            audio = media.has_audio,
            "probed input"
        );
        let layout = self.config.target_layout(&media)?;
        let frame_rate = self.config.output_frame_rate(&media);
        let kind = OutputKind::for_path(output);

        tracker.enter(Stage::Extracting)?;
        let extracted = self.media.extract_frames(&ExtractRequest {
            media: &media,
            layout,
            workdir: workdir.path(),
        })?;
        let frames_in = extracted.frames.len();

        let runner = EffectChainRunner::new(self.effects, &self.config.effects, workdir.path());
        let processed = if media.is_multi_frame_animated() {
            pool.install(|| self.per_frame(tracker, &runner, &extracted.frames, layout))?
        } else {
            pool.install(|| {
                self.codec_path(tracker, &runner, &media, &workdir, &extracted.frames, layout)
            })?
        };

        tracker.enter(Stage::MuxingOutput)?;
        let staged = workdir.file(&staged_name(output));
        let audio_processed = processed.audio.is_some();
        let assembled = assemble(
            self.media,
            AssembleRequest {
                frames: processed.frames,
                frame_rate,
                animation: extracted.animation.as_ref(),
                audio: processed.audio.as_deref(),
                kind,
                output: &staged,
                workdir: workdir.path(),
            },
        )?;
        publish(&staged, output)?;

        tracker.enter(Stage::Done)?;
        workdir.close()?;
        Ok(RunReport {
            shape: media.shape,
            output_kind: assembled.kind,
            frames_in,
            frames_out: assembled.frames_written,
            audio_processed,
            animation: assembled.animation,
            stages: std::mem::take(&mut tracker.visited),
        })
    }

    /// All frames as one sample stream, plus the genuine audio track.
    fn codec_path(
        &self,
        tracker: &mut StageTracker<'_>,
        runner: &EffectChainRunner<'_>,
        media: &MediaDescriptor,
        workdir: &WorkDir,
        originals: &[FrameBuffer],
        layout: FrameLayout,
    ) -> MoshResult<Processed> {
        tracker.enter(Stage::Encoding)?;
        let samples = pixels_to_samples(originals, self.config.bit_depth, self.config.sample_rate)?;
        tracing::debug!(
            samples = samples.len_samples(),
            padding = samples.padding(),
            "pixels encoded as samples"
        );

        tracker.enter(Stage::Effecting)?;
        let effected = runner.run_samples(samples, "video")?;
        let audio = if media.has_audio {
            let track = self.media.extract_audio(media, workdir.path())?;
            Some(runner.run_track(&track)?)
        } else {
            None
        };

        tracker.enter(Stage::Decoding)?;
        let recon = samples_to_frames(&effected, layout)?;
        if recon.frames.len() != originals.len() || recon.dropped_tail_bytes > 0 {
            tracing::info!(
                source_frames = originals.len(),
                output_frames = recon.frames.len(),
                dropped_tail_bytes = recon.dropped_tail_bytes,
                "effect chain changed the stream length"
            );
        }

        tracker.enter(Stage::Reassembling)?;
        let mut frames = recon.frames;
        if let Some(factor) = self.config.blend {
            blend_sequence(&mut frames, originals, factor)?;
        }
        if media.shape == MediaShape::StillImage {
            frames.truncate(1);
        }
        if frames.is_empty() {
            return Err(MoshError::validation(
                "effect output is shorter than one frame, nothing to encode",
            ));
        }
        Ok(Processed { frames, audio })
    }

    /// Every frame is its own sample stream; each yields at most one output frame.
    fn per_frame(
        &self,
        tracker: &mut StageTracker<'_>,
        runner: &EffectChainRunner<'_>,
        originals: &[FrameBuffer],
        layout: FrameLayout,
    ) -> MoshResult<Processed> {
        let (bit_depth, sample_rate) = (self.config.bit_depth, self.config.sample_rate);

        tracker.enter(Stage::Encoding)?;
        let samples = originals
            .par_iter()
            .map(|frame| pixels_to_samples(std::slice::from_ref(frame), bit_depth, sample_rate))
            .collect::<MoshResult<Vec<SampleBuffer>>>()?;

        tracker.enter(Stage::Effecting)?;
        let effected = samples
            .into_par_iter()
            .enumerate()
            .map(|(i, s)| runner.run_samples(s, &format!("frame-{i:05}")))
            .collect::<MoshResult<Vec<SampleBuffer>>>()?;

        tracker.enter(Stage::Decoding)?;
        let decoded = effected
            .par_iter()
            .map(|s| -> MoshResult<Option<FrameBuffer>> {
                Ok(samples_to_frames(s, layout)?.frames.into_iter().next())
            })
            .collect::<MoshResult<Vec<Option<FrameBuffer>>>>()?;
        let dropped = decoded.iter().filter(|f| f.is_none()).count();
        if dropped > 0 {
            tracing::info!(dropped, "frames shorter than one frame after effects were dropped");
        }

        tracker.enter(Stage::Reassembling)?;
        let blend = self.config.blend;
        let frames = decoded
            .into_par_iter()
            .zip(originals.par_iter())
            .filter_map(|(frame, original)| frame.map(|f| (f, original)))
            .map(|(frame, original)| match blend {
                Some(factor) => blend_frames(original, &frame, factor),
                None => Ok(frame),
            })
            .collect::<MoshResult<Vec<FrameBuffer>>>()?;
        if frames.is_empty() {
            return Err(MoshError::validation(
                "every frame's effect output is shorter than one frame, nothing to encode",
            ));
        }
        Ok(Processed {
            frames,
            audio: None,
        })
    }
}

/// Name of the output file while it is still inside working storage.
fn staged_name(output: &Path) -> String {
    match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("output.{ext}"),
        None => "output".to_string(),
    }
}

fn build_thread_pool(threads: Option<usize>) -> MoshResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MoshError::resource(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
