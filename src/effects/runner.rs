use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::codec::pcm::SampleBuffer;
use crate::effects::chain::EffectSpec;
use crate::foundation::core::BitDepth;
use crate::foundation::error::MoshResult;

/// On-disk audio stream handed to an effect processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioStream {
    /// Headerless unsigned little-endian mono PCM.
    Raw {
        /// File location.
        path: PathBuf,
        /// Sample width.
        bit_depth: BitDepth,
        /// Sample rate label in Hz.
        sample_rate: u32,
    },
    /// Self-describing audio file (the genuine audio track).
    Wav {
        /// File location.
        path: PathBuf,
    },
}

impl AudioStream {
    /// File location.
    pub fn path(&self) -> &Path {
        match self {
            AudioStream::Raw { path, .. } | AudioStream::Wav { path } => path,
        }
    }
}

/// One blocking call into the effect collaborator.
#[derive(Clone, Debug)]
pub struct EffectJob<'a> {
    /// Stream to read.
    pub input: AudioStream,
    /// Stream to write, in the same format as `input`.
    pub output: AudioStream,
    /// Ordered effect list.
    pub chain: &'a EffectSpec,
}

/// External audio-effect collaborator.
///
/// Implementations must be callable from several worker threads at once; each job owns its
/// input and output files.
pub trait EffectProcessor: Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Fail with [`MoshError::MissingDependency`](crate::MoshError::MissingDependency) when
    /// the collaborator cannot run.
    fn check_available(&self) -> MoshResult<()>;

    /// Apply `job.chain` to `job.input`, writing `job.output`.
    fn apply(&self, job: &EffectJob<'_>) -> MoshResult<()>;
}

/// Runs one effect chain over the streams of a run, once per stream.
pub struct EffectChainRunner<'a> {
    processor: &'a dyn EffectProcessor,
    chain: &'a EffectSpec,
    workdir: &'a Path,
}

impl<'a> EffectChainRunner<'a> {
    /// Build a runner writing its intermediate files under `workdir`.
    pub fn new(
        processor: &'a dyn EffectProcessor,
        chain: &'a EffectSpec,
        workdir: &'a Path,
    ) -> Self {
        Self {
            processor,
            chain,
            workdir,
        }
    }

    /// Run the chain over a pixel-derived sample stream.
    ///
    /// `tag` names the intermediate files and must be unique among concurrent calls.
    #[tracing::instrument(skip(self, samples), fields(processor = self.processor.name()))]
    pub fn run_samples(&self, samples: SampleBuffer, tag: &str) -> MoshResult<SampleBuffer> {
        let input = self.workdir.join(format!("{tag}.in.raw"));
        let output = self.workdir.join(format!("{tag}.out.raw"));
        std::fs::write(&input, samples.as_bytes())
            .with_context(|| format!("write sample stream '{}'", input.display()))?;

        let raw = |path: &Path| AudioStream::Raw {
            path: path.to_path_buf(),
            bit_depth: samples.bit_depth(),
            sample_rate: samples.sample_rate(),
        };
        self.processor.apply(&EffectJob {
            input: raw(&input),
            output: raw(&output),
            chain: self.chain,
        })?;

        let bytes = std::fs::read(&output)
            .with_context(|| format!("read effected sample stream '{}'", output.display()))?;
        tracing::debug!(
            before = samples.as_bytes().len(),
            after = bytes.len(),
            "effect chain applied"
        );
        // Intermediate files are not read again.
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
        Ok(samples.with_effect_output(bytes))
    }

    /// Run the chain over the genuine audio track, returning the processed file.
    #[tracing::instrument(skip(self), fields(processor = self.processor.name()))]
    pub fn run_track(&self, track: &Path) -> MoshResult<PathBuf> {
        let output = self.workdir.join("audio.effected.wav");
        self.processor.apply(&EffectJob {
            input: AudioStream::Wav {
                path: track.to_path_buf(),
            },
            output: AudioStream::Wav {
                path: output.clone(),
            },
            chain: self.chain,
        })?;
        Ok(output)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/runner.rs"]
mod tests;
