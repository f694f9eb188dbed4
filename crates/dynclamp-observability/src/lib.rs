// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # dynclamp-observability
//!
//! Logging setup shared by every dynclamp binary, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known dynclamp crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "dynclamp",
    "dynclamp-engine",
    "dynclamp-synapse",
    "dynclamp-config",
    "dynclamp-observability",
];

/// Tracing target for a crate name (`dynclamp-engine` -> `dynclamp_engine`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
