//! # unarchive Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the unarchive CLI.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`extract`, `detect`, `replace`) is a variant of the `Commands` enum
//! - Each variant maps to a `handle_*` function in `commands::`
//! - All errors are propagated to this level, printed once, and turned into exit status 1
//!
//! ## Examples
//!
//! ```bash
//! # Extract, collapsing a single top-level folder
//! unarchive extract drupal-10.2.0.tar.gz web
//!
//! # Show how a file was classified, with debug logging
//! unarchive -vv detect mystery.bin
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (extract, detect, replace)
mod common; // Archive, filesystem and process utilities
mod core; // Errors and configuration

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "unarchive",
    about = "Extract zip and tar archives into a predictable directory layout",
    long_about = "Detects the archive type from its content, extracts it with unzip or tar,\n\
                  and collapses a single encapsulating folder so the destination is always\n\
                  the payload root.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "x")]
    Extract(commands::extract::ExtractArgs),
    Detect(commands::detect::DetectArgs),
    Replace(commands::replace::ReplaceArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Extract(args) => commands::extract::handle_extract(args).await,
        Commands::Detect(args) => commands::detect::handle_detect(args).await,
        Commands::Replace(args) => commands::replace::handle_replace(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e); // Alternate form prints the whole context chain.
        std::process::exit(1);
    }

    Ok(())
}
