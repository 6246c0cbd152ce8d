//! Per-invocation scratch space.

use crate::object::ObjectRef;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory owned by exactly one invocation.
///
/// Every invocation gets its own directory, so concurrent invocations
/// touching same-named objects in the same execution environment cannot
/// collide. The directory and its contents are removed on drop, which covers
/// every exit path including scan failures.
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    pub fn new(scratch_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(scratch_root)
            .with_context(|| format!("failed to create scratch root {}", scratch_root.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("clamgate-")
            .tempdir_in(scratch_root)
            .context("failed to create staging directory")?;
        Ok(Self { dir })
    }

    /// Staging path for the object's bytes, named after the key's basename.
    pub fn file_for(&self, object: &ObjectRef) -> PathBuf {
        let name = match object.basename() {
            "" => "object",
            name => name,
        };
        self.dir.path().join(name)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
