// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-facing surface: lifecycle events, the signal table a host UI renders, and
//! the publisher seam for per-tick state.

use crate::settings::{EngineSettings, ParameterSnapshot};
use crate::tick::PublishedState;

/// Lifecycle notifications delivered by the host between ticks
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Module loaded; the runner republishes current parameters and state
    Init,
    /// Operator committed edited parameters
    Modify(EngineSettings),
    /// Host tick period changed (ns)
    Period { period_ns: u64 },
    /// Real-time loop suspended; outputs must read zero
    Pause,
    /// Real-time loop resumed; a new episode starts at t = 0
    Unpause,
}

/// Role of a signal in the host's channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    Output,
    Parameter,
    State,
}

/// One named channel exposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: SignalKind,
}

const fn signal(name: &'static str, description: &'static str, kind: SignalKind) -> SignalDescriptor {
    SignalDescriptor {
        name,
        description,
        kind,
    }
}

/// Channel table, in host order. Inputs and outputs are indexed by position within
/// their kind: input 0..3 feed [`crate::TickInput::from_raw`], outputs 0..1 come from
/// [`crate::TickOutput::as_array`].
pub const SIGNALS: &[SignalDescriptor] = &[
    signal("Cell 1 Vm", "Membrane potential (V)", SignalKind::Input),
    signal("Cell 2 Vm", "Membrane potential (V)", SignalKind::Input),
    signal("Cell 1 Spike state", "Spike State (=1 when spike occurs)", SignalKind::Input),
    signal("Cell 2 Spike state", "Spike State (=1 when spike occurs)", SignalKind::Input),
    signal("Isyn 1-2", "Output current (A)", SignalKind::Output),
    signal("Isyn 2-1", "Output current (A)", SignalKind::Output),
    signal(
        "Coupling delay (ms)",
        "Fixed phase diff at which to turn on coupling automatically",
        SignalKind::Parameter,
    ),
    signal("Tolerance (ms)", "Tolerance for turning on coupling", SignalKind::Parameter),
    signal("Gmax 1-2 (nS)", "Maximum synaptic conductance", SignalKind::Parameter),
    signal("Tau 1-2 (ms)", "Time constant for alpha-shaped conductance", SignalKind::Parameter),
    signal("Esyn 1-2 (mV)", "Reversal potential", SignalKind::Parameter),
    signal("Gmax 2-1 (nS)", "Maximum synaptic conductance", SignalKind::Parameter),
    signal("Tau 2-1 (ms)", "Time constant for alpha-shaped conductance", SignalKind::Parameter),
    signal("Esyn 2-1 (mV)", "Reversal potential", SignalKind::Parameter),
    signal("Phase Diff (s)", "Phase difference (Cell 2 - Cell 1) (s)", SignalKind::State),
    signal("Time (s)", "Time (s)", SignalKind::State),
];

/// Receives the published state after every tick, and the operator parameters
/// whenever the host asks for them (`HostEvent::Init`).
///
/// Implementations run on the tick thread and must not block.
pub trait StatePublisher: Send + Sync {
    fn publish_state(&self, state: &PublishedState) -> Result<(), String>;

    /// Parameters in display units. Publishers that only plot state can ignore them.
    fn publish_parameters(&self, _parameters: &ParameterSnapshot) -> Result<(), String> {
        Ok(())
    }
}

impl<F> StatePublisher for F
where
    F: Fn(&PublishedState) -> Result<(), String> + Send + Sync,
{
    fn publish_state(&self, state: &PublishedState) -> Result<(), String> {
        self(state)
    }
}
