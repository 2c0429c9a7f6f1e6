//! # unarchive Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! This module groups the filesystem-related utilities:
//!
//! - **`io`**: Directory creation, depth-1 listing, moves with a cross-device
//!   fallback, recursive deletion, tree counting, and plain text I/O. This is
//!   the filesystem capability the extractor is built on.
//! - **`replace`**: Find-and-replace inside a single file (`unarchive replace`).
//!
//! Import from the specific submodule:
//!
//! ```rust
//! use crate::common::fs::{io, replace};
//!
//! io::ensure_dir_exists(parent)?;
//! let report = replace::replace_in_file(path, &replace::Pattern::Literal("a".into()), "b")?;
//! ```
//!

/// Filesystem operations used by extraction (`ensure_dir_exists`, `move_path`, `remove_dir_tree`, ...).
pub mod io;
/// In-file text replacement (`replace_in_file`).
pub mod replace;
