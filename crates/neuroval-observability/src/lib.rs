// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neuroval-observability
//!
//! Logging setup shared by every neuroval crate, with per-crate debug flags.
//!
//! Every crate logs under its own `tracing` target (the crate name), so a
//! single crate can be turned up to `debug` with `--debug-<crate>` or
//! `NEUROVAL_DEBUG=<crate>` without flooding the rest of the output.
//!
//! ## Features
//! - `file-logging`: per-run folders of JSON log files, one per crate

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Logging targets of the neuroval crates
pub const KNOWN_CRATES: &[&str] = &[
    "neuroval",
    "neuroval-parameters",
    "neuroval-measurement",
    "neuroval-observability",
];
