//! # unarchive Detect Command Handler
//!
//! File: cli/src/commands/detect.rs
//!
//! ## Overview
//!
//! Implements `unarchive detect <FILE>`: runs only the archive type detector
//! and prints `<kind> (<tier>)`, e.g. `tar.gz (magic bytes)`. A file no tier
//! recognises prints `unknown (no match)`; that is still a successful run.
//!
use crate::{
    common::archive::detect,
    core::error::{Result, UnarchiveError},
};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for `unarchive detect`.
#[derive(Parser, Debug)]
#[command(about = "Show which kind of archive a file is")]
pub struct DetectArgs {
    /// File to inspect.
    file: PathBuf,
}

pub async fn handle_detect(args: DetectArgs) -> Result<()> {
    info!("Handling detect command (File: {})", args.file.display());
    if !args.file.is_file() {
        return Err(UnarchiveError::SourceNotFound { path: args.file }.into());
    }
    let detection = detect::detect(&args.file);
    println!("{} ({})", detection.kind, detection.tier);
    Ok(())
}
