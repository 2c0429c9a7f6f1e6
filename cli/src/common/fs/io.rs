//! # unarchive Filesystem Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module is the "filesystem operations" capability the extractor is
//! built on. Every function reports failures as
//! `UnarchiveError::FilesystemOperationFailed`, naming the operation and the
//! path involved, so a failed extraction always says which step broke.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, rejecting paths that exist as files.
//! - **`list_entries`**: the immediate (depth-1) entries of a directory, sorted.
//! - **`is_empty_dir`**: whether a directory has no entries.
//! - **`move_path`**: `rename`, falling back to copy-then-delete (`fs_extra`)
//!   when source and target live on different filesystems.
//! - **`remove_dir_tree`**: recursive delete that treats "already gone" as success.
//! - **`count_tree`**: files and directories below a root (`walkdir`).
//! - **`read_file_to_string`** / **`write_string_to_file`**: text I/O for the
//!   `replace` command.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(parent)?;
//! let entries = io::list_entries(&scratch)?;
//! io::move_path(&entries[0], &destination)?;
//! io::remove_dir_tree(&scratch)?;
//! ```
//!
use crate::core::error::{ExtractResult, UnarchiveError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, this function creates the directory,
/// including any necessary parent directories (similar to `mkdir -p`).
///
/// # Errors
///
/// Returns `FilesystemOperationFailed` if:
/// - The path exists but is not a directory.
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> ExtractResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| UnarchiveError::fs("create directory", path, e))?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        return Err(UnarchiveError::fs(
            "create directory",
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Lists the immediate entries of `dir`, sorted by path.
///
/// Hidden entries are included; only `.` and `..` are skipped (the OS never
/// reports them here anyway).
pub fn list_entries(dir: &Path) -> ExtractResult<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|e| UnarchiveError::fs("list directory", dir, e))?;
    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| UnarchiveError::fs("list directory", dir, e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Returns `true` if `dir` is a directory with no entries.
pub fn is_empty_dir(dir: &Path) -> ExtractResult<bool> {
    let mut read_dir =
        fs::read_dir(dir).map_err(|e| UnarchiveError::fs("list directory", dir, e))?;
    Ok(read_dir.next().is_none())
}

/// Moves `from` to `to`.
///
/// A plain `rename` is tried first. If the two paths are on different
/// filesystems the content is copied and the source deleted instead. `to`
/// must not exist, or be an empty directory (which `rename` replaces on Unix).
pub fn move_path(from: &Path, to: &Path) -> ExtractResult<()> {
    match fs::rename(from, to) {
        Ok(()) => {
            debug!("Renamed {:?} -> {:?}", from, to);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                "Rename {:?} -> {:?} crosses filesystems; copying instead",
                from, to
            );
            copy_then_remove(from, to)
        }
        Err(e) => Err(UnarchiveError::fs("rename", from, e)),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> ExtractResult<()> {
    if from.is_dir() {
        ensure_dir_exists(to)?;
        let mut options = fs_extra::dir::CopyOptions::new();
        options.content_only = true;
        fs_extra::dir::move_dir(from, to, &options)
            .map_err(|e| UnarchiveError::fs("move directory", from, io::Error::other(e)))?;
        // move_dir empties the source; make sure the directory itself is gone too.
        remove_dir_tree(from)?;
    } else {
        fs::copy(from, to).map_err(|e| UnarchiveError::fs("copy file", from, e))?;
        fs::remove_file(from).map_err(|e| UnarchiveError::fs("remove file", from, e))?;
    }
    Ok(())
}

/// Recursively deletes `path`. A path that no longer exists is not an error.
pub fn remove_dir_tree(path: &Path) -> ExtractResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed directory tree {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UnarchiveError::fs("remove directory", path, e)),
    }
}

/// Counts the files and directories below `root`, excluding `root` itself.
///
/// Symbolic links are counted as files and not followed.
pub fn count_tree(root: &Path) -> ExtractResult<(usize, usize)> {
    let mut files = 0;
    let mut directories = 0;
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            UnarchiveError::fs("walk directory", &path, io::Error::other(e))
        })?;
        if entry.file_type().is_dir() {
            directories += 1;
        } else {
            files += 1;
        }
    }
    Ok((files, directories))
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> ExtractResult<String> {
    fs::read_to_string(path).map_err(|e| UnarchiveError::fs("read file", path, e))
}

/// Writes string content to a file, overwriting it if it exists.
///
/// The parent directory is created first if needed.
pub fn write_string_to_file(path: &Path, content: &str) -> ExtractResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).map_err(|e| UnarchiveError::fs("write file", path, e))?;
    info!("Wrote content to file: {:?}", path);
    Ok(())
}
