// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Alpha Synapse Parameters
//!
//! ```text
//! g(t)   = -g_max × (t / τ) × exp(-(t - τ) / τ)
//! I_syn  = g(t) × (V_post - E_syn)
//! ```
//!
//! Internal state is always SI (Siemens, seconds, Volts). Operators edit the
//! same quantities in nS, ms and mV; conversion happens only here, at the boundary.

use crate::error::{require_finite, require_positive, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nano-scale conversion factor (nS -> S)
pub const NANO: f64 = 1e-9;

/// Milli-scale conversion factor (ms -> s, mV -> V)
pub const MILLI: f64 = 1e-3;

/// Which way current flows between the two coupled cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Cell 1 is presynaptic, current is injected into cell 2
    OneToTwo,
    /// Cell 2 is presynaptic, current is injected into cell 1
    TwoToOne,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::OneToTwo, Direction::TwoToOne];

    /// Short label used in parameter names ("1-2", "2-1")
    pub fn label(self) -> &'static str {
        match self {
            Direction::OneToTwo => "1-2",
            Direction::TwoToOne => "2-1",
        }
    }

}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters of one directional alpha synapse (SI units)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapseParameters {
    /// Peak conductance (S)
    pub g_max: f64,

    /// Alpha time constant (s); the conductance peaks at t = τ
    pub tau: f64,

    /// Reversal potential (V)
    pub e_syn: f64,
}

impl SynapseParameters {
    pub fn new(g_max: f64, tau: f64, e_syn: f64) -> Self {
        Self { g_max, tau, e_syn }
    }

    /// Build parameters from operator-facing units (nS, ms, mV)
    pub fn from_display_units(g_max_ns: f64, tau_ms: f64, e_syn_mv: f64) -> Self {
        Self {
            g_max: g_max_ns * NANO,
            tau: tau_ms * MILLI,
            e_syn: e_syn_mv * MILLI,
        }
    }

    /// Express the parameters in operator-facing units: `(nS, ms, mV)`
    pub fn to_display_units(&self) -> (f64, f64, f64) {
        (self.g_max / NANO, self.tau / MILLI, self.e_syn / MILLI)
    }

    /// Check that the parameters describe a buildable waveform.
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_positive("g_max", self.g_max)?;
        require_positive("tau", self.tau)?;
        require_finite("e_syn", self.e_syn)?;
        Ok(())
    }

    /// True when switching from `self` to `other` requires a new waveform
    pub fn changes_waveform(&self, other: &SynapseParameters) -> bool {
        self.g_max != other.g_max || self.tau != other.tau
    }
}

impl Default for SynapseParameters {
    /// 0.04 nS peak, 10 ms time constant, inhibitory -70 mV reversal
    fn default() -> Self {
        Self {
            g_max: 0.04e-9,
            tau: 10e-3,
            e_syn: -70e-3,
        }
    }
}
