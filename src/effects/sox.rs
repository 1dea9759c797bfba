use crate::effects::runner::{AudioStream, EffectJob, EffectProcessor};
use crate::foundation::error::{MoshError, MoshResult};
use crate::foundation::invocation::{Invocation, is_tool_on_path};

/// [`EffectProcessor`] backed by the system `sox` binary.
#[derive(Clone, Debug)]
pub struct SoxProcessor {
    program: String,
}

impl Default for SoxProcessor {
    fn default() -> Self {
        Self {
            program: "sox".to_string(),
        }
    }
}

impl SoxProcessor {
    /// Use a specific `sox` executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the invocation for `job` without running it.
    ///
    /// Global options disable dithering and fix the random seed so identical inputs give
    /// identical bytes.
    pub fn invocation(&self, job: &EffectJob<'_>) -> MoshResult<Invocation> {
        let inv = Invocation::new(&self.program).args(["-D", "-R", "-V2"]);
        let inv = push_stream(inv, &job.input);
        let inv = push_stream(inv, &job.output);
        match (&job.input, &job.output) {
            (AudioStream::Raw { .. }, AudioStream::Raw { .. })
            | (AudioStream::Wav { .. }, AudioStream::Wav { .. }) => {}
            _ => {
                return Err(MoshError::validation(
                    "sox input and output streams must share a format",
                ));
            }
        }
        Ok(inv.args(job.chain.to_args()))
    }
}

fn push_stream(inv: Invocation, stream: &AudioStream) -> Invocation {
    match stream {
        AudioStream::Raw {
            path,
            bit_depth,
            sample_rate,
        } => inv
            .args(["-t", "raw", "-r"])
            .arg(sample_rate.to_string())
            .args(["-e", "unsigned-integer", "-b"])
            .arg(bit_depth.bits().to_string())
            .args(["-c", "1", "-L"])
            .path(path),
        AudioStream::Wav { path } => inv.path(path),
    }
}

impl EffectProcessor for SoxProcessor {
    fn name(&self) -> &str {
        &self.program
    }

    fn check_available(&self) -> MoshResult<()> {
        if is_tool_on_path(&self.program, "--version") {
            Ok(())
        } else {
            Err(MoshError::missing_dependency(format!(
                "'{}' is required to apply audio effects, but was not found on PATH",
                self.program
            )))
        }
    }

    #[tracing::instrument(skip(self, job), fields(chain = %job.chain))]
    fn apply(&self, job: &EffectJob<'_>) -> MoshResult<()> {
        self.invocation(job)?.run().map(|_| ())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sox.rs"]
mod tests;
