/// Convenience result type used across audiomosh.
pub type MoshResult<T> = Result<T, MoshError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every kind is fatal: the pipeline never produces partial output and never retries.
#[derive(thiserror::Error, Debug)]
pub enum MoshError {
    /// Missing or invalid arguments.
    #[error("usage error: {0}")]
    Usage(String),

    /// A required external tool is not installed or not on `PATH`.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// The input asset cannot be read or probed.
    #[error("input error: {0}")]
    FatalInput(String),

    /// A decode, effect or encode invocation reported failure.
    #[error("collaborator error: {invocation} exited with {status}\n{diagnostics}")]
    Collaborator {
        /// Rendered invocation (program followed by its ordered arguments).
        invocation: String,
        /// Exit status description.
        status: String,
        /// Full diagnostic output of the collaborator, verbatim.
        diagnostics: String,
    },

    /// Working storage could not be created.
    #[error("resource error: {0}")]
    Resource(String),

    /// Internal contract violation (buffer sizes, frame counts, configuration ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// An interrupt was honored at a stage boundary.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MoshError {
    /// Build a [`MoshError::Usage`] value.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Build a [`MoshError::MissingDependency`] value.
    pub fn missing_dependency(msg: impl Into<String>) -> Self {
        Self::MissingDependency(msg.into())
    }

    /// Build a [`MoshError::FatalInput`] value.
    pub fn fatal_input(msg: impl Into<String>) -> Self {
        Self::FatalInput(msg.into())
    }

    /// Build a [`MoshError::Collaborator`] value.
    pub fn collaborator(
        invocation: impl Into<String>,
        status: impl Into<String>,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self::Collaborator {
            invocation: invocation.into(),
            status: status.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Build a [`MoshError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`MoshError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MoshError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// `true` for errors the CLI answers by printing usage.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
