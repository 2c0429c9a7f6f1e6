//! # unarchive Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command handlers in `commands::`:
//!
//! - **`archive`**: detection, extraction and scratch directories.
//! - **`fs`**: filesystem operations and in-file text replacement.
//! - **`process`**: running external programs with cancellation and timeouts.
//!
//! Command handlers import from the specific submodule:
//!
//! ```rust
//! use crate::common::{archive::detect, fs::replace, process::SystemRunner};
//! ```
//!

/// Archive detection and extraction.
pub mod archive;
/// Filesystem utilities (`io`, `replace`).
pub mod fs;
/// External command execution (`ProcessRunner`, `SystemRunner`).
pub mod process;
