// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed engine settings (SI units) and their conversion from display-unit configuration

use dynclamp_config::{validate_config, CouplingConfig, SynapseSection};
use dynclamp_synapse::parameters::MILLI;
use dynclamp_synapse::{Direction, SynapseParameters};

use crate::error::{EngineError, EngineResult};
use crate::host::{SignalKind, SIGNALS};

/// Everything an operator can edit between ticks, in SI units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Phase difference at which automation switches coupling on (s)
    pub coupling_delay: f64,
    /// Accepted distance from `coupling_delay` (s)
    pub tolerance: f64,
    pub synapse_1_2: SynapseParameters,
    pub synapse_2_1: SynapseParameters,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            coupling_delay: 0.1875,
            tolerance: 0.010,
            synapse_1_2: SynapseParameters::default(),
            synapse_2_1: SynapseParameters::default(),
        }
    }
}

impl EngineSettings {
    /// Build settings from operator units: delay and tolerance in ms
    pub fn from_display_units(
        coupling_delay_ms: f64,
        tolerance_ms: f64,
        synapse_1_2: SynapseParameters,
        synapse_2_1: SynapseParameters,
    ) -> Self {
        Self {
            coupling_delay: coupling_delay_ms * MILLI,
            tolerance: tolerance_ms * MILLI,
            synapse_1_2,
            synapse_2_1,
        }
    }

    pub fn synapse(&self, direction: Direction) -> &SynapseParameters {
        match direction {
            Direction::OneToTwo => &self.synapse_1_2,
            Direction::TwoToOne => &self.synapse_2_1,
        }
    }

    /// Field-level validation. Waveform length limits depend on the host period and
    /// are checked when the profiles are built.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.coupling_delay.is_finite() {
            return Err(EngineError::InvalidSetting {
                field: "coupling_delay",
                value: self.coupling_delay,
                reason: "must be finite",
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(EngineError::InvalidSetting {
                field: "tolerance",
                value: self.tolerance,
                reason: "must be finite and not negative",
            });
        }
        for direction in Direction::ALL {
            self.synapse(direction)
                .validate()
                .map_err(EngineError::synapse(direction))?;
        }
        Ok(())
    }
}

/// Operator-facing parameter values, in the units of the host's parameter signals
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    pub coupling_delay_ms: f64,
    pub tolerance_ms: f64,
    pub synapse_1_2: SynapseSection,
    pub synapse_2_1: SynapseSection,
}

impl ParameterSnapshot {
    /// Values in [`SIGNALS`] parameter order
    pub fn values(&self) -> [f64; 8] {
        [
            self.coupling_delay_ms,
            self.tolerance_ms,
            self.synapse_1_2.gmax_ns,
            self.synapse_1_2.tau_ms,
            self.synapse_1_2.esyn_mv,
            self.synapse_2_1.gmax_ns,
            self.synapse_2_1.tau_ms,
            self.synapse_2_1.esyn_mv,
        ]
    }

    /// `(signal name, value)` pairs for a host writing its parameter channels
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        SIGNALS
            .iter()
            .filter(|s| s.kind == SignalKind::Parameter)
            .map(|s| s.name)
            .zip(self.values())
    }
}

impl EngineSettings {
    /// Convert back to operator units (ms, nS, mV)
    pub fn to_display_units(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            coupling_delay_ms: self.coupling_delay / MILLI,
            tolerance_ms: self.tolerance / MILLI,
            synapse_1_2: section_from_synapse(&self.synapse_1_2),
            synapse_2_1: section_from_synapse(&self.synapse_2_1),
        }
    }
}

fn section_from_synapse(params: &SynapseParameters) -> SynapseSection {
    let (gmax_ns, tau_ms, esyn_mv) = params.to_display_units();
    SynapseSection {
        gmax_ns,
        tau_ms,
        esyn_mv,
    }
}

fn synapse_from_section(section: &SynapseSection) -> SynapseParameters {
    SynapseParameters::from_display_units(section.gmax_ns, section.tau_ms, section.esyn_mv)
}

impl TryFrom<&CouplingConfig> for EngineSettings {
    type Error = EngineError;

    /// Validate the display-unit configuration and convert it to SI
    fn try_from(config: &CouplingConfig) -> EngineResult<Self> {
        validate_config(config)?;
        let settings = EngineSettings::from_display_units(
            config.coupling.delay_ms,
            config.coupling.tolerance_ms,
            synapse_from_section(&config.synapse_1_2),
            synapse_from_section(&config.synapse_2_1),
        );
        settings.validate()?;
        Ok(settings)
    }
}
