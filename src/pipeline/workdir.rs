use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{MoshError, MoshResult};

/// Uniquely named working directory scoped to one run.
///
/// The directory and everything in it is removed exactly once: by [`WorkDir::close`] or, on
/// any other exit path, when the value is dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: tempfile::TempDir,
}

impl WorkDir {
    /// Create a fresh directory under `root`, or under the system temp dir.
    pub fn create(root: Option<&Path>) -> MoshResult<Self> {
        let root = root.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let dir = tempfile::Builder::new()
            .prefix("audiomosh-")
            .tempdir_in(&root)
            .map_err(|e| {
                MoshError::resource(format!(
                    "cannot create working directory under '{}': {e}",
                    root.display()
                ))
            })?;
        tracing::debug!(path = %dir.path().display(), "working directory created");
        Ok(Self { dir })
    }

    /// Directory location.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the working directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory, reporting failures instead of ignoring them.
    pub fn close(self) -> MoshResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("remove working directory '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workdir.rs"]
mod tests;
