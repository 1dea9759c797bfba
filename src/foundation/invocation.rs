use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use crate::foundation::error::{MoshError, MoshResult};

/// One typed argument of an external invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    /// Literal text argument (flag, value, effect token).
    Text(String),
    /// Filesystem path, passed through as an `OsStr`.
    Path(PathBuf),
}

impl Arg {
    fn as_os_str(&self) -> &OsStr {
        match self {
            Arg::Text(s) => OsStr::new(s),
            Arg::Path(p) => p.as_os_str(),
        }
    }
}

/// Structured description of an external tool call: a program and its ordered arguments.
///
/// Arguments are handed to the OS one by one, never joined into a shell string, so no
/// argument ever needs escaping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<Arg>,
}

impl Invocation {
    /// Start an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one text argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Text(arg.into()));
        self
    }

    /// Append several text arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|a| Arg::Text(a.into())));
        self
    }

    /// Append a path argument.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push(Arg::Path(path.as_ref().to_path_buf()));
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Ordered arguments.
    pub fn arg_list(&self) -> &[Arg] {
        &self.args
    }

    /// Text arguments only, in order. Used to compare effect lists between invocations.
    pub fn text_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|a| match a {
                Arg::Text(s) => Some(s.as_str()),
                Arg::Path(_) => None,
            })
            .collect()
    }

    /// Build a `std::process::Command` with stdin closed and stdout/stderr captured.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(Arg::as_os_str))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run to completion and return the captured output.
    ///
    /// A program that cannot be spawned because it does not exist maps to
    /// [`MoshError::MissingDependency`]; a non-zero exit maps to [`MoshError::Collaborator`]
    /// carrying the full stderr text.
    pub fn run(&self) -> MoshResult<Output> {
        tracing::debug!(invocation = %self, "running collaborator");
        let out = self.to_command().output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MoshError::missing_dependency(format!(
                    "'{}' was not found on PATH (is it installed?)",
                    self.program
                ))
            } else {
                MoshError::collaborator(self.to_string(), "spawn failure", e.to_string())
            }
        })?;

        if !out.status.success() {
            return Err(MoshError::collaborator(
                self.to_string(),
                out.status.to_string(),
                String::from_utf8_lossy(&out.stderr).trim_end().to_string(),
            ));
        }
        Ok(out)
    }
}

impl fmt::Display for Invocation {
    /// Human-readable rendering for diagnostics only; never executed through a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            let text = arg.as_os_str().to_string_lossy();
            if text.is_empty() || text.contains(char::is_whitespace) {
                write!(f, " '{text}'")?;
            } else {
                write!(f, " {text}")?;
            }
        }
        Ok(())
    }
}

/// Return `true` when `program` can be invoked from `PATH`.
pub fn is_tool_on_path(program: &str, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/invocation.rs"]
mod tests;
