// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Alpha Conductance Waveform
//!
//! The conductance time course is precomputed once per parameter set and then
//! played back as a fixed-length impulse response, one sample per tick:
//!
//! ```text
//! n    = floor(10 × τ / dt) + 1
//! g[i] = -g_max × (i·dt / τ) × exp(-(i·dt - τ) / τ)      0 ≤ i < n
//! ```
//!
//! The profile is negative by construction (outward deflection convention) and
//! reaches `-g_max` at `i·dt = τ`. Playback cost is a single slice read, so no
//! transcendental function is evaluated on the tick path.

use crate::error::{require_positive, Result, SynapseError};
use crate::parameters::SynapseParameters;

/// Length of the precomputed window, in multiples of τ
pub const WAVEFORM_SPAN_TAUS: f64 = 10.0;

/// Upper bound on profile length (4 Mi samples, 32 MiB of f64)
pub const MAX_WAVEFORM_SAMPLES: usize = 1 << 22;

/// Number of samples a profile with time constant `tau` needs at period `dt`.
///
/// # Errors
/// `InvalidParameter` if `tau` or `dt` is not a positive finite number,
/// `WaveformTooLong` if the result would exceed [`MAX_WAVEFORM_SAMPLES`].
pub fn waveform_len(tau: f64, dt: f64) -> Result<usize> {
    require_positive("tau", tau)?;
    require_positive("dt", dt)?;

    let span = WAVEFORM_SPAN_TAUS * tau / dt;
    if !span.is_finite() || span >= MAX_WAVEFORM_SAMPLES as f64 {
        return Err(SynapseError::WaveformTooLong {
            requested: span,
            max: MAX_WAVEFORM_SAMPLES,
            tau,
            dt,
        });
    }

    Ok(span.floor() as usize + 1)
}

/// A sampled alpha conductance profile for one synapse direction.
///
/// Immutable once built; a parameter change produces a whole new profile.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformProfile {
    samples: Box<[f64]>,
}

impl WaveformProfile {
    /// Build the profile for a synapse at host period `dt`
    pub fn for_synapse(params: &SynapseParameters, dt: f64) -> Result<Self> {
        WaveformGenerator::build(params.g_max, params.tau, dt)
    }

    /// Number of samples (ticks) covered by the profile
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `cursor`, or `None` once the waveform has played out
    #[inline]
    pub fn get(&self, cursor: usize) -> Option<f64> {
        self.samples.get(cursor).copied()
    }

    /// Sample at `cursor`, treating an expired cursor as zero conductance
    #[inline(always)]
    pub fn sample_or_zero(&self, cursor: usize) -> f64 {
        match self.samples.get(cursor) {
            Some(&g) => g,
            None => 0.0,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }
}

/// Builds [`WaveformProfile`]s. Stateless; exists so callers can name the step.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformGenerator;

impl WaveformGenerator {
    /// Precompute an alpha conductance profile covering 10τ at resolution `dt`.
    ///
    /// Pure function of its inputs. Allocates exactly one buffer of
    /// `floor(10τ/dt) + 1` samples.
    pub fn build(g_max: f64, tau: f64, dt: f64) -> Result<WaveformProfile> {
        require_positive("g_max", g_max)?;
        let n = waveform_len(tau, dt)?;

        let samples: Box<[f64]> = (0..n)
            .map(|i| {
                let t = i as f64 * dt;
                -g_max * (t / tau) * (-(t - tau) / tau).exp()
            })
            .collect();

        Ok(WaveformProfile { samples })
    }
}
