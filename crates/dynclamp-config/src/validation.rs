// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Range checks on the display-unit values. Anything that passes here can still be
//! rejected by the engine if the resulting waveform would be too long for the
//! configured host period; that check needs both values and lives with the engine.

use crate::{ConfigError, ConfigResult, CouplingConfig, SynapseSection};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotFinite { field: String },
    NotPositive { field: String, value: f64 },
    Negative { field: String, value: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be greater than zero", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Finite values everywhere
/// - Strictly positive conductances, time constants and host period
/// - Non-negative tolerance
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &CouplingConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_coupling(config, &mut errors);
    validate_synapse("synapse_1_2", &config.synapse_1_2, &mut errors);
    validate_synapse("synapse_2_1", &config.synapse_2_1, &mut errors);
    validate_host(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn check_finite(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) -> bool {
    if value.is_finite() {
        true
    } else {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
        false
    }
}

fn check_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if check_finite(field, value, errors) && value <= 0.0 {
        errors.push(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_coupling(config: &CouplingConfig, errors: &mut Vec<ConfigValidationError>) {
    check_finite("coupling.delay_ms", config.coupling.delay_ms, errors);

    let tolerance = config.coupling.tolerance_ms;
    if check_finite("coupling.tolerance_ms", tolerance, errors) && tolerance < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: "coupling.tolerance_ms".to_string(),
            value: tolerance,
        });
    }
}

fn validate_synapse(
    section: &str,
    synapse: &SynapseSection,
    errors: &mut Vec<ConfigValidationError>,
) {
    check_positive(&format!("{}.gmax_ns", section), synapse.gmax_ns, errors);
    check_positive(&format!("{}.tau_ms", section), synapse.tau_ms, errors);
    check_finite(&format!("{}.esyn_mv", section), synapse.esyn_mv, errors);
}

fn validate_host(config: &CouplingConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.host.period_ns == 0 {
        errors.push(ConfigValidationError::NotPositive {
            field: "host.period_ns".to_string(),
            value: 0.0,
        });
    }
}

fn validate_logging(config: &CouplingConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
