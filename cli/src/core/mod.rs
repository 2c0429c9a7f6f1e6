//! # unarchive Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by every command:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: The `UnarchiveError` enum and result aliases
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{ExtractResult, Result, UnarchiveError}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
