//! # unarchive Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout unarchive. The core
//! operations (detection, extraction, text replacement) report a specific,
//! matchable failure kind; the command handlers wrap those failures with
//! context for the user.
//!
//! ## Architecture
//!
//! The error system consists of three pieces:
//! - `UnarchiveError`: A `thiserror` enum naming every failure kind
//! - `ExtractResult<T>`: `std::result::Result<T, UnarchiveError>`, returned by core operations
//! - `Result<T>`: A type alias for `anyhow::Result<T>`, used by command handlers and config loading
//!
//! The extraction kinds are mutually exclusive:
//! - `SourceNotFound`: the archive does not exist at call time
//! - `UndetectableType`: no detection tier recognised the file
//! - `ExtractionCommandFailed`: unzip/tar exited non-zero, could not be launched, or timed out
//! - `FilesystemOperationFailed`: create/enumerate/move/delete failed
//!
//! plus `Cancelled`, `DestinationBusy`, the text replacement kinds, and `Config`.
//!
//! ## Examples
//!
//! ```rust
//! match extractor.extract(&archive, &dest, &cancel).await {
//!     Ok(report) => println!("{} files", report.files),
//!     Err(UnarchiveError::UndetectableType { path }) => {
//!         eprintln!("not an archive: {}", path.display());
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Custom error type for unarchive.
// No PartialEq derive because io::Error and regex::Error sources don't implement it.
#[derive(Error, Debug)]
pub enum UnarchiveError {
    #[error("Archive '{}' does not exist.", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Could not determine type of archive for '{}'.", path.display())]
    UndetectableType { path: PathBuf },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExtractionCommandFailed {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("Filesystem operation '{operation}' failed on '{}': {source}", path.display())]
    FilesystemOperationFailed {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Extraction into '{}' was cancelled.", path.display())]
    Cancelled { path: PathBuf },

    #[error("Another extraction into '{}' is already in progress.", path.display())]
    DestinationBusy { path: PathBuf },

    #[error("File '{}' does not exist.", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl UnarchiveError {
    /// Builds a `FilesystemOperationFailed` for `operation` on `path`.
    pub fn fs(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::FilesystemOperationFailed {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type returned by the core operations.
pub type ExtractResult<T> = std::result::Result<T, UnarchiveError>;

/// Type alias for Result using anyhow::Error for command handlers.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
