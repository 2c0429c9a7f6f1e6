//! # unarchive Replace Command Handler
//!
//! File: cli/src/commands/replace.rs
//!
//! ## Overview
//!
//! Implements `unarchive replace <FILE> --from <TEXT> --to <TEXT> [--regex]`,
//! a find-and-replace over one file. It is typically used right after an
//! extraction to patch a settings file or a version string, but it shares
//! nothing with the extraction pipeline.
//!
//! ## Usage
//!
//! ```bash
//! unarchive replace web/sites/default/settings.php --from "'host' => ''" --to "'host' => 'db'"
//! unarchive replace VERSION --regex --from '(\d+)\.(\d+)' --to '$1.$2.0'
//! ```
//!
//! Prints `'<file>' updated. <n> items replaced` or
//! `'<file>' unchanged. 0 items replaced`.
//!
use crate::{
    common::fs::replace::{self, Pattern},
    core::error::Result,
};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// # Replace Arguments (`ReplaceArgs`)
///
/// Command-line arguments for `unarchive replace`.
#[derive(Parser, Debug)]
#[command(about = "Replace text inside a file")]
pub struct ReplaceArgs {
    /// File to modify in place.
    file: PathBuf,

    /// Text (or, with --regex, expression) to search for.
    #[arg(long, value_name = "TEXT")]
    from: String,

    /// Replacement text. With --regex, `$1`-style captures are expanded.
    #[arg(long, value_name = "TEXT")]
    to: String,

    /// Treat --from as a regular expression.
    #[arg(long)]
    regex: bool,
}

/// # Handle Replace Command (`handle_replace`)
///
/// Replaces every occurrence and reports the count. Zero matches is a success
/// and leaves the file untouched.
pub async fn handle_replace(args: ReplaceArgs) -> Result<()> {
    info!(
        "Handling replace command (File: {}, Regex: {})",
        args.file.display(),
        args.regex
    );
    let pattern = if args.regex {
        Pattern::regex(&args.from)?
    } else {
        Pattern::Literal(args.from.clone())
    };

    let report = replace::replace_in_file(&args.file, &pattern, &args.to)
        .with_context(|| format!("Failed to replace text in '{}'", args.file.display()))?;

    let outcome = if report.replaced > 0 {
        "updated"
    } else {
        "unchanged"
    };
    println!(
        "'{}' {}. {} items replaced",
        report.path.display(),
        outcome,
        report.replaced
    );
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_args_parsing() {
        let args = ReplaceArgs::try_parse_from([
            "replace", "VERSION", "--from", "1.0", "--to", "2.0", "--regex",
        ])
        .unwrap();
        assert_eq!(args.file, PathBuf::from("VERSION"));
        assert_eq!(args.from, "1.0");
        assert_eq!(args.to, "2.0");
        assert!(args.regex);
    }

    #[test]
    fn test_replace_args_require_from_and_to() {
        assert!(ReplaceArgs::try_parse_from(["replace", "f", "--from", "a"]).is_err());
        assert!(ReplaceArgs::try_parse_from(["replace", "f", "--to", "b"]).is_err());
    }

    #[tokio::test]
    async fn test_handle_replace_invalid_regex() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "abc").unwrap();
        let result = handle_replace(ReplaceArgs {
            file,
            from: "(".to_string(),
            to: "x".to_string(),
            regex: true,
        })
        .await;
        assert!(result.is_err());
    }
}
