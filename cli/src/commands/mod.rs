//! # unarchive Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level command. Each defines a clap `Args` struct and an
//! async `handle_*` function that `main.rs` routes to.
//!
//! - `extract`: extract an archive into a normalized destination
//! - `detect`: report the detected archive kind of a file
//! - `replace`: find-and-replace inside a file
//!

/// `unarchive detect`
pub mod detect;
/// `unarchive extract`
pub mod extract;
/// `unarchive replace`
pub mod replace;
