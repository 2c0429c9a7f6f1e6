//! # unarchive CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: locating the
//! compiled binary, isolating a run from the developer's own configuration,
//! and building small archives in-process with the `tar` and `flate2` crates.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns an `assert_cmd::Command` for the compiled `unarchive` binary.
pub fn unarchive_cmd() -> Command {
    Command::cargo_bin("unarchive").expect("Failed to find unarchive binary for testing")
}

/// # Isolated Command (`isolated_cmd`)
///
/// An `unarchive` command that runs inside `workdir` and ignores any user or
/// project configuration on the machine running the tests: `workdir` gets a
/// `.git` marker (stopping the project config search) and `UNARCHIVE_CONFIG`
/// points at an empty file.
pub fn isolated_cmd(workdir: &Path) -> Command {
    fs::create_dir_all(workdir.join(".git")).unwrap();
    let config = workdir.join(".git/empty-config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = unarchive_cmd();
    cmd.current_dir(workdir)
        .env("UNARCHIVE_CONFIG", config)
        .env_remove("UNARCHIVE_TAR")
        .env_remove("UNARCHIVE_UNZIP")
        .env_remove("RUST_LOG");
    cmd
}

/// Whether `program --version` runs on this machine.
pub fn host_has(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn append_entries<W: std::io::Write>(builder: &mut tar::Builder<W>, entries: &[(&str, &str)]) {
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap();
    }
}

/// Writes a gzip-compressed tar at `path` holding `entries` as (path, content).
pub fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_entries(&mut builder, entries);
    builder.into_inner().unwrap().finish().unwrap();
}

/// Writes an uncompressed tar at `path` holding `entries` as (path, content).
pub fn write_tar(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut builder = tar::Builder::new(file);
    append_entries(&mut builder, entries);
    builder.finish().unwrap();
}

/// Every path below `root` (relative, sorted) with file contents, for tree comparison.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Option<Vec<u8>>)> {
    let mut entries: Vec<_> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            let content = entry
                .file_type()
                .is_file()
                .then(|| fs::read(entry.path()).unwrap());
            (relative, content)
        })
        .collect();
    entries.sort();
    entries
}

/// Names of leftover scratch directories directly inside `dir`.
pub fn scratch_leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".unarchive-"))
        .collect()
}
