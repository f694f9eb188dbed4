// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-tick input/output values exchanged with the host

/// Raw value the host writes on a spike channel during the tick a spike is detected
pub const SPIKE_FLAG: f64 = 1.0;

/// Inputs sampled by the host for one tick
///
/// Spike flags have level semantics: the engine reacts every tick a flag is set,
/// so the spike detector upstream must hold it for exactly one tick per event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Cell 1 membrane potential (V)
    pub vm1: f64,
    /// Cell 2 membrane potential (V)
    pub vm2: f64,
    /// Cell 1 spiked this tick
    pub spike1: bool,
    /// Cell 2 spiked this tick
    pub spike2: bool,
}

impl TickInput {
    pub fn new(vm1: f64, vm2: f64, spike1: bool, spike2: bool) -> Self {
        Self {
            vm1,
            vm2,
            spike1,
            spike2,
        }
    }

    /// Decode host input channels `[Vm1, Vm2, spike1, spike2]`.
    ///
    /// A spike channel counts only when it holds exactly [`SPIKE_FLAG`].
    #[inline]
    pub fn from_raw(channels: [f64; 4]) -> Self {
        Self {
            vm1: channels[0],
            vm2: channels[1],
            spike1: channels[2] == SPIKE_FLAG,
            spike2: channels[3] == SPIKE_FLAG,
        }
    }
}

/// Synaptic currents produced for one tick (A)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutput {
    /// Current injected into cell 2 by the 1→2 synapse
    pub isyn_1_2: f64,
    /// Current injected into cell 1 by the 2→1 synapse
    pub isyn_2_1: f64,
}

impl TickOutput {
    pub const ZERO: TickOutput = TickOutput {
        isyn_1_2: 0.0,
        isyn_2_1: 0.0,
    };

    /// Host output channels `[Isyn 1-2, Isyn 2-1]`
    #[inline]
    pub fn as_array(&self) -> [f64; 2] {
        [self.isyn_1_2, self.isyn_2_1]
    }
}

/// Read-only values republished to the host after every tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PublishedState {
    /// Cell 2 spike time minus cell 1 spike time, measured at the last cell-2 spike (s)
    pub phase_difference: f64,
    /// Time since the episode started (s)
    pub elapsed_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_requires_exact_flag() {
        let input = TickInput::from_raw([-0.065, -0.060, 1.0, 0.0]);
        assert_eq!(input.vm1, -0.065);
        assert_eq!(input.vm2, -0.060);
        assert!(input.spike1);
        assert!(!input.spike2);

        let noisy = TickInput::from_raw([0.0, 0.0, 0.999, 2.0]);
        assert!(!noisy.spike1);
        assert!(!noisy.spike2);
    }

    #[test]
    fn test_output_channels() {
        let out = TickOutput {
            isyn_1_2: 1e-12,
            isyn_2_1: -2e-12,
        };
        assert_eq!(out.as_array(), [1e-12, -2e-12]);
        assert_eq!(TickOutput::ZERO.as_array(), [0.0, 0.0]);
    }
}
