// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # dynclamp Coupling Engine
//!
//! Reciprocally couples two neurons with alpha synapses. Each tick the engine reads
//! the membrane potential and spike flag of both cells and writes two synaptic
//! currents, one per direction.
//!
//! ## Tick contract
//! - [`CouplingEngine::execute`] is total: it never fails, blocks or allocates
//! - Waveforms are rebuilt only by configuration updates, which the host serializes
//!   with tick execution
//! - A cursor beyond its waveform reads as zero conductance
//!
//! ## Coupling modes
//! ```text
//!              couple command, or automation with
//!              |phase_diff - delay| < tolerance at a cell-2 spike
//!   Uncoupled ───────────────────────────────────────────▶ Coupled
//!       ▲                                                    │
//!       └──────────────── uncouple command ──────────────────┘
//! ```
//!
//! Phase tracking (`cell2 spike time - cell1 spike time`) runs in both modes.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod commands;
pub mod engine;
pub mod error;
pub mod host;
pub mod runner;
pub mod settings;
pub mod tick;

pub use commands::{CommandQueue, EngineCommand};
pub use engine::{CouplingEngine, CouplingMode};
pub use error::{EngineError, EngineResult};
pub use host::{HostEvent, SignalDescriptor, SignalKind, StatePublisher, SIGNALS};
pub use runner::CouplingRunner;
pub use settings::{EngineSettings, ParameterSnapshot};
pub use tick::{PublishedState, TickInput, TickOutput};

// Re-export the synapse primitives the engine API is expressed in
pub use dynclamp_synapse::{Direction, SynapseParameters, WaveformProfile};
