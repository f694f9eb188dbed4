// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for engine configuration
//!
//! The tick path has no error type: every configuration problem is caught here,
//! before the live engine state is modified.

use dynclamp_synapse::{Direction, SynapseError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Synapse {direction}: {source}")]
    Synapse {
        direction: Direction,
        #[source]
        source: SynapseError,
    },

    #[error("Invalid host period: {0}")]
    Period(#[source] SynapseError),

    #[error("Invalid coupling setting {field} = {value}: {reason}")]
    InvalidSetting {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn synapse(direction: Direction) -> impl FnOnce(SynapseError) -> EngineError {
        move |source| EngineError::Synapse { direction, source }
    }
}

impl From<dynclamp_config::ConfigError> for EngineError {
    fn from(err: dynclamp_config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
