// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `dynclamp.toml`:
//!
//! ```toml
//! [coupling]
//! delay_ms = 187.5
//! tolerance_ms = 10.0
//! automate = false
//!
//! [synapse_1_2]
//! gmax_ns = 0.04
//! tau_ms = 10.0
//! esyn_mv = -70.0
//!
//! [synapse_2_1]
//! gmax_ns = 0.04
//! tau_ms = 10.0
//! esyn_mv = -70.0
//!
//! [host]
//! period_ns = 100000
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CouplingConfig {
    pub coupling: CouplingSection,
    pub synapse_1_2: SynapseSection,
    pub synapse_2_1: SynapseSection,
    pub host: HostConfig,
    pub logging: LoggingConfig,
}

/// Phase-triggered coupling settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CouplingSection {
    /// Phase difference (cell 2 - cell 1) at which coupling switches on automatically
    pub delay_ms: f64,
    /// Accepted distance from `delay_ms` for the automatic trigger
    pub tolerance_ms: f64,
    /// Arm the automatic trigger at startup
    pub automate: bool,
    /// Start in the coupled state
    pub start_coupled: bool,
}

impl Default for CouplingSection {
    fn default() -> Self {
        Self {
            delay_ms: 187.5,
            tolerance_ms: 10.0,
            automate: false,
            start_coupled: false,
        }
    }
}

/// One directional alpha synapse, in display units
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynapseSection {
    /// Peak conductance (nS)
    pub gmax_ns: f64,
    /// Alpha time constant (ms)
    pub tau_ms: f64,
    /// Reversal potential (mV)
    pub esyn_mv: f64,
}

impl Default for SynapseSection {
    fn default() -> Self {
        Self {
            gmax_ns: 0.04,
            tau_ms: 10.0,
            esyn_mv: -70.0, // inhibitory
        }
    }
}

/// Host real-time scheduler settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Tick period (ns)
    pub period_ns: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            period_ns: 100_000, // 10 kHz
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
