//! # unarchive Archive Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Everything that turns an archive file into a directory tree:
//!
//! - **`detect`**: three-tier archive type detection (content-type probe,
//!   magic bytes, file name).
//! - **`extract`**: the `Extractor`, which runs `unzip`/`tar` into a scratch
//!   directory and normalizes the result into the destination.
//! - **`scratch`**: the self-deleting scratch directory guard.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{detect, extract::{ExtractSettings, Extractor}};
//!
//! let kind = detect::detect(&path).kind;
//! let report = Extractor::new(SystemRunner::default(), ExtractSettings::default())
//!     .extract(&path, &dest, &cancel)
//!     .await?;
//! ```
//!

/// Archive type detection (`detect`, `detect_with`, `ArchiveKind`).
pub mod detect;
/// Extraction and normalization (`Extractor`, `ExtractionReport`).
pub mod extract;
/// Scratch directory guard (`ScratchDir`).
pub mod scratch;
