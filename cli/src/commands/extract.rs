//! # unarchive Extract Command Handler
//!
//! File: cli/src/commands/extract.rs
//!
//! ## Overview
//!
//! Implements `unarchive extract <ARCHIVE> <DESTINATION>`. The handler wires
//! configuration, the system process runner and Ctrl-C handling around
//! [`Extractor::extract`] and prints a one-line summary on success.
//!
//! ## Architecture
//!
//! 1. Load the merged configuration (`core::config::load_config`).
//! 2. Resolve programs, scratch root and timeout. Command-line flags (and the
//!    `UNARCHIVE_UNZIP` / `UNARCHIVE_TAR` environment variables behind them)
//!    win over the configuration file.
//! 3. Spawn a task that cancels the extraction on Ctrl-C. Cancellation kills
//!    the running `unzip`/`tar` and removes the scratch directory.
//! 4. Run the extraction and report the result.
//!
//! ## Usage
//!
//! ```bash
//! unarchive extract drupal-10.2.0.tar.gz web
//! unarchive extract --tar gtar --timeout 300 release.tgz /srv/app
//! ```
//!
use crate::{
    common::{
        archive::extract::{ExtractSettings, Extractor},
        process::SystemRunner,
    },
    core::{
        config::{self, Config},
        error::Result,
    },
};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// # Extract Arguments (`ExtractArgs`)
///
/// Command-line arguments for `unarchive extract`.
#[derive(Parser, Debug)]
#[command(about = "Extract an archive so the destination becomes its payload root")]
pub struct ExtractArgs {
    /// Archive to extract (zip, tar, tar.gz or tar.bz2).
    archive: PathBuf,

    /// Directory that receives the payload. Must be missing or empty.
    destination: PathBuf,

    /// Program used for zip archives.
    #[arg(long, env = "UNARCHIVE_UNZIP", value_name = "PROGRAM")]
    unzip: Option<String>,

    /// Program used for tar archives.
    #[arg(long, env = "UNARCHIVE_TAR", value_name = "PROGRAM")]
    tar: Option<String>,

    /// Kill the extraction command after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

/// # Handle Extract Command (`handle_extract`)
///
/// Extracts `args.archive` into `args.destination` and prints
/// `Extracted <kind> archive '<src>' to '<dest>' (<n> files, <m> directories)`.
///
/// ## Returns
///
/// * `Err` wrapping the `UnarchiveError` kind if any step fails. The
///   destination is not populated in that case.
pub async fn handle_extract(args: ExtractArgs) -> Result<()> {
    info!(
        "Handling extract command (Archive: {}, Destination: {})",
        args.archive.display(),
        args.destination.display()
    );
    let cfg = config::load_config().context("Failed to load configuration")?;
    let (settings, timeout) = resolve_settings(&args, &cfg);
    let extractor = Extractor::new(SystemRunner::new(timeout), settings);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt_watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping extraction");
            on_interrupt.cancel();
        }
    });

    let result = extractor
        .extract(&args.archive, &args.destination, &cancel)
        .await;
    interrupt_watcher.abort();

    let report = result
        .with_context(|| format!("Failed to extract '{}'", args.archive.display()))?;

    if let Some(wrapper) = &report.collapsed_wrapper {
        info!("Collapsed encapsulating folder '{}'", wrapper);
    }
    println!(
        "Extracted {} archive '{}' to '{}' ({} files, {} directories)",
        report.kind,
        args.archive.display(),
        report.destination.display(),
        report.files,
        report.directories
    );
    Ok(())
}

/// Combines flags and configuration into extractor settings and a timeout.
fn resolve_settings(args: &ExtractArgs, cfg: &Config) -> (ExtractSettings, Option<Duration>) {
    let settings = ExtractSettings {
        unzip_program: args.unzip.clone().unwrap_or_else(|| cfg.tools.unzip.clone()),
        tar_program: args.tar.clone().unwrap_or_else(|| cfg.tools.tar.clone()),
        scratch_root: cfg.extract.scratch_dir.as_ref().map(PathBuf::from),
    };
    let timeout = args
        .timeout
        .or(cfg.extract.timeout_secs)
        .map(Duration::from_secs);
    (settings, timeout)
}
