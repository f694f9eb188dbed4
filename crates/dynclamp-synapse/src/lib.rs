// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # dynclamp Synapse Primitives
//!
//! Everything needed to describe one directional alpha synapse:
//! - **Parameters**: peak conductance, time constant and reversal potential (SI units)
//! - **Units**: conversion from the operator-facing display units (nS, ms, mV)
//! - **Waveform**: the precomputed, sign-inverted alpha conductance profile that the
//!   coupling engine plays back one sample per tick
//!
//! Nothing in this crate runs on the real-time tick path except
//! [`WaveformProfile::sample_or_zero`], which is a bounds-checked slice read.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod parameters;
pub mod waveform;

pub use error::{Result, SynapseError};
pub use parameters::{Direction, SynapseParameters};
pub use waveform::{
    waveform_len, WaveformGenerator, WaveformProfile, MAX_WAVEFORM_SAMPLES, WAVEFORM_SPAN_TAUS,
};
