//! # unarchive In-File Text Replacement (`common::fs::replace`)
//!
//! File: cli/src/common/fs/replace.rs
//!
//! ## Overview
//!
//! Find-and-replace inside a single text file, used by `unarchive replace`
//! to patch files after extraction (version strings, paths in scaffolded
//! settings files). It is independent of the extraction pipeline.
//!
//! A pattern is either a literal string or a regular expression. Every
//! occurrence is replaced. The file is only rewritten when at least one
//! occurrence was found; otherwise it is left byte-for-byte untouched. Both
//! cases succeed and report the number of replacements.
//!
use crate::common::fs::io;
use crate::core::error::{ExtractResult, UnarchiveError};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

/// What to search for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match the text exactly.
    Literal(String),
    /// Match a regular expression; the replacement may use `$1`-style captures.
    Regex(Regex),
}

impl Pattern {
    /// Compiles `pattern` as a regular expression.
    pub fn regex(pattern: &str) -> ExtractResult<Self> {
        Regex::new(pattern)
            .map(Pattern::Regex)
            .map_err(|source| UnarchiveError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Returns the replaced text and the number of replacements made.
    fn apply(&self, text: &str, replacement: &str) -> (String, usize) {
        match self {
            Pattern::Literal(needle) if needle.is_empty() => (text.to_string(), 0),
            Pattern::Literal(needle) => {
                let count = text.matches(needle.as_str()).count();
                (text.replace(needle.as_str(), replacement), count)
            }
            Pattern::Regex(re) => {
                let count = re.find_iter(text).count();
                (re.replace_all(text, replacement).into_owned(), count)
            }
        }
    }
}

/// Outcome of a replacement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceReport {
    pub path: PathBuf,
    pub replaced: usize,
}

/// Replaces every match of `pattern` in the file at `path` with `replacement`.
pub fn replace_in_file(
    path: &Path,
    pattern: &Pattern,
    replacement: &str,
) -> ExtractResult<ReplaceReport> {
    if !path.is_file() {
        return Err(UnarchiveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = io::read_file_to_string(path)?;
    let (updated, replaced) = pattern.apply(&text, replacement);

    if replaced > 0 {
        io::write_string_to_file(path, &updated)?;
        info!("'{}' updated. {} items replaced", path.display(), replaced);
    } else {
        info!("'{}' unchanged. 0 items replaced", path.display());
    }

    Ok(ReplaceReport {
        path: path.to_path_buf(),
        replaced,
    })
}
