//! # dynclamp - Reciprocal Synaptic Coupling for Dynamic Clamp
//!
//! Couples two recorded neurons through a pair of simulated alpha synapses. A
//! real-time host calls the engine once per fixed period with both membrane
//! potentials and spike flags, and injects the two returned currents back into the
//! cells. Coupling can be switched on by an operator or automatically once the
//! measured phase difference between the cells reaches a target delay.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynclamp::prelude::*;
//!
//! let mut engine = CouplingEngine::with_period_ns(EngineSettings::default(), 100_000)?;
//! engine.set_automate(true);
//!
//! // Inside the host's real-time callback
//! let input = TickInput::from_raw([-0.065, -0.060, 1.0, 0.0]);
//! let [isyn_1_2, isyn_2_1] = engine.execute(&input).as_array();
//! # let _ = (isyn_1_2, isyn_2_1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Loading parameters from `dynclamp.toml`
//!
//! ```rust,no_run
//! use dynclamp::config::load_config;
//! use dynclamp::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let mut runner = CouplingRunner::new(CouplingEngine::from_config(&config)?);
//!
//! // Operator thread
//! let queue = runner.queue();
//! queue.push(EngineCommand::SetCoupled(true));
//!
//! // Tick thread
//! let output = runner.tick(&TickInput::default());
//! # let _ = output;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: dynclamp-synapse, dynclamp-config          │
//! │  (alpha waveforms, TOML + env + CLI configuration)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Real-time: dynclamp-engine                             │
//! │  (coupling state machine, host events, command queue)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: dynclamp-observability                 │
//! │  (tracing subscriber, per-crate debug flags)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use dynclamp_config as config;
pub use dynclamp_engine as engine;
pub use dynclamp_observability as observability;
pub use dynclamp_synapse as synapse;

/// Prelude for hosts embedding the engine
pub mod prelude {
    pub use crate::engine::{
        CommandQueue, CouplingEngine, CouplingMode, CouplingRunner, EngineCommand, EngineError,
        EngineResult, EngineSettings, HostEvent, PublishedState, StatePublisher, TickInput,
        TickOutput,
    };
    pub use crate::synapse::{Direction, SynapseParameters, WaveformProfile};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
