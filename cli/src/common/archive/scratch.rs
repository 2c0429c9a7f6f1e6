//! # unarchive Scratch Directories (`common::archive::scratch`)
//!
//! File: cli/src/common/archive/scratch.rs
//!
//! ## Overview
//!
//! An extraction first unpacks into a private scratch directory and only then
//! moves the result into place. [`ScratchDir`] owns that directory: it is
//! created with a unique `.unarchive-<uuid>` name and deleted when the guard
//! is dropped, unless it was handed over with [`ScratchDir::persist_as`].
//! Every early return in the extractor (failed command, cancellation, failed
//! move) therefore cleans up after itself.
//!
use crate::common::fs::io;
use crate::core::error::{ExtractResult, UnarchiveError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix of every scratch directory name.
pub const SCRATCH_PREFIX: &str = ".unarchive-";

/// A uniquely named working directory removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Creates a fresh scratch directory inside `root`, creating `root` if needed.
    pub fn create_in(root: &Path) -> ExtractResult<Self> {
        io::ensure_dir_exists(root)?;
        let path = root.join(format!("{}{}", SCRATCH_PREFIX, Uuid::new_v4()));
        // Fails if the name is already taken; a scratch directory is never shared.
        fs::create_dir(&path).map_err(|e| UnarchiveError::fs("create scratch directory", &path, e))?;
        debug!("Created scratch directory {:?}", path);
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the scratch directory itself to `target`. The guard is disarmed
    /// only if the move succeeds.
    pub fn persist_as(mut self, target: &Path) -> ExtractResult<()> {
        io::move_path(&self.path, target)?;
        self.armed = false;
        Ok(())
    }

    /// Deletes the scratch directory now, reporting any failure.
    pub fn close(mut self) -> ExtractResult<()> {
        self.armed = false;
        io::remove_dir_tree(&self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Discarded scratch directory {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch directory {:?}: {}", self.path, e),
        }
    }
}
