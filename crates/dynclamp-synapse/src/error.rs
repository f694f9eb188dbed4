// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for synapse configuration and waveform construction

use thiserror::Error;

/// Errors raised while validating synapse parameters or building a waveform.
///
/// None of these can occur on the tick path; they are all produced at the
/// configuration boundary before any live profile is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynapseError {
    #[error("Invalid {field} = {value}: {reason}")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Waveform would need {requested} samples (tau = {tau} s, dt = {dt} s), limit is {max}")]
    WaveformTooLong {
        requested: f64,
        max: usize,
        tau: f64,
        dt: f64,
    },
}

pub type Result<T> = core::result::Result<T, SynapseError>;

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SynapseError::InvalidParameter {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(SynapseError::InvalidParameter {
            field,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SynapseError::InvalidParameter {
            field,
            value,
            reason: "must be finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("tau", 0.01).is_ok());
        assert!(matches!(
            require_positive("tau", 0.0),
            Err(SynapseError::InvalidParameter { field: "tau", .. })
        ));
        assert!(require_positive("tau", -1.0).is_err());
        assert!(require_positive("tau", f64::NAN).is_err());
        assert!(require_positive("tau", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SynapseError::InvalidParameter {
            field: "g_max",
            value: -1.0,
            reason: "must be positive",
        };
        assert_eq!(err.to_string(), "Invalid g_max = -1: must be positive");
    }
}
