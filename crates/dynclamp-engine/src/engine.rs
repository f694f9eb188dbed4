// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Coupling Engine
//!
//! ## Per-tick algorithm
//!
//! ```text
//! t = tick_count × dt
//!
//! Coupled:
//!     spike1 → cursor₁ = 0, t₁ = t
//!     I₁₂ = g₁[cursor₁] × (Vm2 - E₁)      (0 once cursor₁ ≥ len(g₁))
//!     cursor₁ += 1
//!     spike2 → cursor₂ = 0, t₂ = t, Δφ = t₂ - t₁
//!     I₂₁ = g₂[cursor₂] × (Vm1 - E₂)
//!     cursor₂ += 1
//!
//! Uncoupled:
//!     spike1 → t₁ = t
//!     spike2 → t₂ = t, Δφ = t₂ - t₁,
//!              couple if automate ∧ |Δφ - delay| < tolerance
//!     I₁₂ = I₂₁ = 0
//!
//! tick_count += 1
//! ```

use dynclamp_config::CouplingConfig;
use dynclamp_synapse::{Direction, SynapseError, SynapseParameters, WaveformProfile};
use tracing::{debug, info, trace, warn};

use crate::commands::EngineCommand;
use crate::error::{EngineError, EngineResult};
use crate::host::HostEvent;
use crate::settings::{EngineSettings, ParameterSnapshot};
use crate::tick::{PublishedState, TickInput, TickOutput};

/// Coupling state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouplingMode {
    /// Synapses silent; spike times and phase difference still tracked
    #[default]
    Uncoupled,
    /// Both synapses play back their waveform on every presynaptic spike
    Coupled,
}

/// One direction of the reciprocal coupling: its parameters, waveform and playback state
#[derive(Debug, Clone)]
struct DirectionalSynapse {
    params: SynapseParameters,
    profile: WaveformProfile,
    /// Playback position; past the end of `profile` means the synapse has decayed
    cursor: usize,
    /// Time of the presynaptic cell's last spike (s)
    last_spike_time: f64,
}

impl DirectionalSynapse {
    fn new(params: SynapseParameters, profile: WaveformProfile) -> Self {
        Self {
            params,
            profile,
            cursor: 0,
            last_spike_time: 0.0,
        }
    }

    #[inline(always)]
    fn record_spike(&mut self, now: f64) {
        self.cursor = 0;
        self.last_spike_time = now;
    }

    /// Advance playback by one tick and return the injected current
    #[inline(always)]
    fn drive(&mut self, spiked: bool, now: f64, postsynaptic_vm: f64) -> f64 {
        if spiked {
            self.record_spike(now);
        }
        let current = self.profile.sample_or_zero(self.cursor) * (postsynaptic_vm - self.params.e_syn);
        self.cursor = self.cursor.saturating_add(1);
        current
    }
}

/// Reciprocal alpha-synapse coupling engine.
///
/// Owned by the thread that runs the host tick. All mutating methods other than
/// [`CouplingEngine::execute`] are configuration-time operations and must not be
/// interleaved with a tick.
#[derive(Debug, Clone)]
pub struct CouplingEngine {
    /// Host tick period (s)
    dt: f64,
    settings: EngineSettings,
    syn_1_2: DirectionalSynapse,
    syn_2_1: DirectionalSynapse,
    mode: CouplingMode,
    automate: bool,
    paused: bool,
    phase_difference: f64,
    elapsed_time: f64,
    tick_count: u64,
    output: TickOutput,
}

fn build_profiles(
    settings: &EngineSettings,
    dt: f64,
) -> EngineResult<(WaveformProfile, WaveformProfile)> {
    let profile_1_2 = WaveformProfile::for_synapse(&settings.synapse_1_2, dt)
        .map_err(EngineError::synapse(Direction::OneToTwo))?;
    let profile_2_1 = WaveformProfile::for_synapse(&settings.synapse_2_1, dt)
        .map_err(EngineError::synapse(Direction::TwoToOne))?;
    Ok((profile_1_2, profile_2_1))
}

fn validate_period(dt: f64) -> EngineResult<()> {
    if dt.is_finite() && dt > 0.0 {
        return Ok(());
    }
    Err(EngineError::Period(SynapseError::InvalidParameter {
        field: "dt",
        value: dt,
        reason: "must be a positive finite number",
    }))
}

impl CouplingEngine {
    /// Create an engine in the `Uncoupled` state with automation off.
    ///
    /// # Arguments
    /// * `settings` - Coupling and synapse parameters (SI)
    /// * `dt` - Host tick period (s)
    ///
    /// # Errors
    /// Any invalid setting, a non-positive period, or a waveform longer than
    /// [`dynclamp_synapse::MAX_WAVEFORM_SAMPLES`].
    pub fn new(settings: EngineSettings, dt: f64) -> EngineResult<Self> {
        settings.validate()?;
        validate_period(dt)?;
        let (profile_1_2, profile_2_1) = build_profiles(&settings, dt)?;

        info!(
            "Coupling engine created: dt={:.3e}s, waveform samples 1-2={} 2-1={}",
            dt,
            profile_1_2.len(),
            profile_2_1.len()
        );

        Ok(Self {
            dt,
            settings,
            syn_1_2: DirectionalSynapse::new(settings.synapse_1_2, profile_1_2),
            syn_2_1: DirectionalSynapse::new(settings.synapse_2_1, profile_2_1),
            mode: CouplingMode::Uncoupled,
            automate: false,
            paused: false,
            phase_difference: 0.0,
            elapsed_time: 0.0,
            tick_count: 0,
            output: TickOutput::ZERO,
        })
    }

    /// Create an engine with the host period given in nanoseconds
    pub fn with_period_ns(settings: EngineSettings, period_ns: u64) -> EngineResult<Self> {
        Self::new(settings, period_ns_to_secs(period_ns))
    }

    /// Create an engine from a display-unit configuration, honouring its
    /// `automate` and `start_coupled` switches
    pub fn from_config(config: &CouplingConfig) -> EngineResult<Self> {
        let settings = EngineSettings::try_from(config)?;
        let mut engine = Self::with_period_ns(settings, config.host.period_ns)?;
        engine.set_automate(config.coupling.automate);
        if config.coupling.start_coupled {
            engine.set_coupled(true);
        }
        Ok(engine)
    }

    // ═══════════════════════════════════════════════════════════
    // Tick path
    // ═══════════════════════════════════════════════════════════

    /// Run one tick.
    ///
    /// Total and allocation-free. While paused the engine holds its state and
    /// returns zero currents.
    pub fn execute(&mut self, input: &TickInput) -> TickOutput {
        if self.paused {
            self.output = TickOutput::ZERO;
            return self.output;
        }

        let now = self.tick_count as f64 * self.dt;
        self.elapsed_time = now;

        self.output = match self.mode {
            CouplingMode::Coupled => {
                let isyn_1_2 = self.syn_1_2.drive(input.spike1, now, input.vm2);
                let isyn_2_1 = self.syn_2_1.drive(input.spike2, now, input.vm1);
                if input.spike2 {
                    self.update_phase_difference(now);
                }
                TickOutput { isyn_1_2, isyn_2_1 }
            }
            CouplingMode::Uncoupled => {
                if input.spike1 {
                    self.syn_1_2.last_spike_time = now;
                }
                if input.spike2 {
                    self.syn_2_1.last_spike_time = now;
                    self.update_phase_difference(now);
                    if self.automation_triggered() {
                        trace!(
                            "Automatic coupling at t={:.6}s (phase diff {:.6}s)",
                            now,
                            self.phase_difference
                        );
                        self.transition(CouplingMode::Coupled);
                    }
                }
                TickOutput::ZERO
            }
        };

        self.tick_count += 1;
        self.output
    }

    #[inline(always)]
    fn update_phase_difference(&mut self, cell2_spike_time: f64) {
        self.phase_difference = cell2_spike_time - self.syn_1_2.last_spike_time;
    }

    #[inline(always)]
    fn automation_triggered(&self) -> bool {
        self.automate
            && (self.phase_difference - self.settings.coupling_delay).abs() < self.settings.tolerance
    }

    /// Enter `mode`, silencing both outputs and rewinding both cursors.
    /// Spike times and phase memory are kept.
    fn transition(&mut self, mode: CouplingMode) {
        self.mode = mode;
        self.output = TickOutput::ZERO;
        self.syn_1_2.cursor = 0;
        self.syn_2_1.cursor = 0;
    }

    // ═══════════════════════════════════════════════════════════
    // Operator commands
    // ═══════════════════════════════════════════════════════════

    /// Couple (`true`) or uncouple (`false`) the cells.
    ///
    /// Re-issuing the current mode is a no-op.
    pub fn set_coupled(&mut self, coupled: bool) {
        let target = if coupled {
            CouplingMode::Coupled
        } else {
            CouplingMode::Uncoupled
        };
        if target == self.mode {
            debug!("Coupling already {:?}, ignoring command", target);
            return;
        }
        info!("Coupling mode {:?} -> {:?} (operator)", self.mode, target);
        self.transition(target);
    }

    /// Arm or disarm the phase-triggered automatic coupling
    pub fn set_automate(&mut self, enabled: bool) {
        if self.automate != enabled {
            info!(
                "Automatic coupling {} (delay {:.4}s ± {:.4}s)",
                if enabled { "armed" } else { "disarmed" },
                self.settings.coupling_delay,
                self.settings.tolerance
            );
        }
        self.automate = enabled;
    }

    /// Apply any queued command
    pub fn apply(&mut self, command: EngineCommand) -> EngineResult<()> {
        match command {
            EngineCommand::SetCoupled(coupled) => {
                self.set_coupled(coupled);
                Ok(())
            }
            EngineCommand::SetAutomate(enabled) => {
                self.set_automate(enabled);
                Ok(())
            }
            EngineCommand::Host(event) => self.update(event),
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Host lifecycle and configuration
    // ═══════════════════════════════════════════════════════════

    /// Handle a host lifecycle event
    pub fn update(&mut self, event: HostEvent) -> EngineResult<()> {
        match event {
            HostEvent::Init => {
                debug!(
                    "Init: mode {:?}, dt={:.3e}s, parameters {:?}",
                    self.mode,
                    self.dt,
                    self.parameters()
                );
                Ok(())
            }
            HostEvent::Modify(settings) => self.reconfigure(settings),
            HostEvent::Period { period_ns } => {
                // Outputs go silent as on a pause, whether or not the new period is accepted
                self.output = TickOutput::ZERO;
                self.set_period(period_ns_to_secs(period_ns))
            }
            HostEvent::Pause => {
                self.pause();
                Ok(())
            }
            HostEvent::Unpause => {
                self.unpause();
                Ok(())
            }
        }
    }

    /// Replace the coupling and synapse parameters.
    ///
    /// New waveforms are built before anything is swapped in, so on error the
    /// previous parameters and profiles stay live. Mode and cursors are preserved;
    /// a cursor beyond a shortened waveform simply reads as expired.
    pub fn reconfigure(&mut self, settings: EngineSettings) -> EngineResult<()> {
        if let Err(e) = settings.validate() {
            warn!("Rejected coupling settings: {}", e);
            return Err(e);
        }

        let rebuild_1_2 = self.syn_1_2.params.changes_waveform(&settings.synapse_1_2);
        let rebuild_2_1 = self.syn_2_1.params.changes_waveform(&settings.synapse_2_1);

        let profile_1_2 = if rebuild_1_2 {
            Some(self.build_profile(Direction::OneToTwo, &settings.synapse_1_2, self.dt)?)
        } else {
            None
        };
        let profile_2_1 = if rebuild_2_1 {
            Some(self.build_profile(Direction::TwoToOne, &settings.synapse_2_1, self.dt)?)
        } else {
            None
        };

        if let Some(profile) = profile_1_2 {
            self.syn_1_2.profile = profile;
        }
        if let Some(profile) = profile_2_1 {
            self.syn_2_1.profile = profile;
        }
        self.syn_1_2.params = settings.synapse_1_2;
        self.syn_2_1.params = settings.synapse_2_1;
        self.settings = settings;

        info!(
            "Coupling settings applied: delay={:.4}s tolerance={:.4}s, rebuilt 1-2={} 2-1={}",
            settings.coupling_delay, settings.tolerance, rebuild_1_2, rebuild_2_1
        );
        Ok(())
    }

    /// Change the host tick period (s), rebuilding both waveforms
    pub fn set_period(&mut self, dt: f64) -> EngineResult<()> {
        if let Err(e) = validate_period(dt) {
            warn!("Rejected host period {}: {}", dt, e);
            return Err(e);
        }
        let profile_1_2 = self.build_profile(Direction::OneToTwo, &self.settings.synapse_1_2, dt)?;
        let profile_2_1 = self.build_profile(Direction::TwoToOne, &self.settings.synapse_2_1, dt)?;

        self.syn_1_2.profile = profile_1_2;
        self.syn_2_1.profile = profile_2_1;
        self.dt = dt;

        info!(
            "Host period set to {:.3e}s, waveform samples 1-2={} 2-1={}",
            dt,
            self.syn_1_2.profile.len(),
            self.syn_2_1.profile.len()
        );
        Ok(())
    }

    fn build_profile(
        &self,
        direction: Direction,
        params: &SynapseParameters,
        dt: f64,
    ) -> EngineResult<WaveformProfile> {
        WaveformProfile::for_synapse(params, dt).map_err(|source| {
            let err = EngineError::Synapse { direction, source };
            warn!("Waveform rebuild rejected: {}", err);
            err
        })
    }

    /// Suspend output. Mode, cursors and spike times are left untouched.
    pub fn pause(&mut self) {
        if !self.paused {
            info!("Paused at t={:.6}s", self.elapsed_time);
        }
        self.paused = true;
        self.output = TickOutput::ZERO;
    }

    /// Resume and start a new episode: time and both cursors restart from zero,
    /// spike times and phase memory are kept.
    pub fn unpause(&mut self) {
        info!("Unpaused, episode clock reset");
        self.paused = false;
        self.tick_count = 0;
        self.elapsed_time = 0.0;
        self.syn_1_2.cursor = 0;
        self.syn_2_1.cursor = 0;
    }

    // ═══════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════

    pub fn mode(&self) -> CouplingMode {
        self.mode
    }

    pub fn is_coupled(&self) -> bool {
        self.mode == CouplingMode::Coupled
    }

    pub fn is_automated(&self) -> bool {
        self.automate
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Host tick period (s)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Current settings in display units, as republished on `HostEvent::Init`
    pub fn parameters(&self) -> ParameterSnapshot {
        self.settings.to_display_units()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time of the most recent tick (s)
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Cell 2 minus cell 1 spike time at the last cell-2 spike (s)
    pub fn phase_difference(&self) -> f64 {
        self.phase_difference
    }

    /// Values republished to the host after each tick
    pub fn state(&self) -> PublishedState {
        PublishedState {
            phase_difference: self.phase_difference,
            elapsed_time: self.elapsed_time,
        }
    }

    /// Currents written by the most recent tick or state change
    pub fn output(&self) -> TickOutput {
        self.output
    }

    fn synapse(&self, direction: Direction) -> &DirectionalSynapse {
        match direction {
            Direction::OneToTwo => &self.syn_1_2,
            Direction::TwoToOne => &self.syn_2_1,
        }
    }

    pub fn profile(&self, direction: Direction) -> &WaveformProfile {
        &self.synapse(direction).profile
    }

    pub fn cursor(&self, direction: Direction) -> usize {
        self.synapse(direction).cursor
    }

    /// Last spike time of the presynaptic cell of `direction` (s)
    pub fn last_spike_time(&self, direction: Direction) -> f64 {
        self.synapse(direction).last_spike_time
    }
}

fn period_ns_to_secs(period_ns: u64) -> f64 {
    period_ns as f64 * 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1e-4;

    fn engine() -> CouplingEngine {
        CouplingEngine::new(EngineSettings::default(), DT).unwrap()
    }

    fn quiet(vm: f64) -> TickInput {
        TickInput::new(vm, vm, false, false)
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        assert_eq!(engine.mode(), CouplingMode::Uncoupled);
        assert!(!engine.is_automated());
        assert!(!engine.is_paused());
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.output(), TickOutput::ZERO);
        assert_eq!(engine.profile(Direction::OneToTwo).len(), 1001);
    }

    #[test]
    fn test_uncoupled_outputs_zero_and_tracks_phase() {
        let mut engine = engine();
        let mut spike1 = quiet(-0.06);
        spike1.spike1 = true;
        let mut spike2 = quiet(-0.06);
        spike2.spike2 = true;

        for _ in 0..10 {
            assert_eq!(engine.execute(&quiet(-0.06)), TickOutput::ZERO);
        }
        engine.execute(&spike1); // tick 10
        for _ in 0..4 {
            engine.execute(&quiet(-0.06));
        }
        assert_eq!(engine.execute(&spike2), TickOutput::ZERO); // tick 15

        let expected = 15.0 * DT - 10.0 * DT;
        assert_eq!(engine.phase_difference(), expected);
        assert_eq!(engine.last_spike_time(Direction::TwoToOne), 15.0 * DT);
        assert_eq!(engine.mode(), CouplingMode::Uncoupled);
        // Cursors do not advance while uncoupled
        assert_eq!(engine.cursor(Direction::OneToTwo), 0);
    }

    #[test]
    fn test_set_coupled_resets_cursors_and_output() {
        let mut engine = engine();
        engine.set_coupled(true);
        for _ in 0..5 {
            engine.execute(&quiet(-0.05));
        }
        assert_eq!(engine.cursor(Direction::OneToTwo), 5);
        assert_ne!(engine.output(), TickOutput::ZERO);

        engine.set_coupled(false);
        assert_eq!(engine.output(), TickOutput::ZERO);
        assert_eq!(engine.cursor(Direction::OneToTwo), 0);
        assert_eq!(engine.cursor(Direction::TwoToOne), 0);
    }

    #[test]
    fn test_repeated_couple_command_is_noop() {
        let mut engine = engine();
        engine.set_coupled(true);
        for _ in 0..3 {
            engine.execute(&quiet(-0.05));
        }
        engine.set_coupled(true);
        assert_eq!(engine.cursor(Direction::OneToTwo), 3);
    }

    #[test]
    fn test_phase_memory_survives_transitions() {
        let mut engine = engine();
        engine.execute(&TickInput::new(0.0, 0.0, true, false));
        engine.execute(&TickInput::new(0.0, 0.0, false, true));
        let phase = engine.phase_difference();
        assert_eq!(phase, DT);

        engine.set_coupled(true);
        engine.set_coupled(false);
        assert_eq!(engine.phase_difference(), phase);
        assert_eq!(engine.last_spike_time(Direction::OneToTwo), 0.0);
        assert_eq!(engine.last_spike_time(Direction::TwoToOne), DT);
    }

    #[test]
    fn test_pause_holds_state() {
        let mut engine = engine();
        engine.set_coupled(true);
        for _ in 0..3 {
            engine.execute(&quiet(-0.05));
        }
        engine.pause();
        assert!(engine.is_paused());
        assert_eq!(engine.output(), TickOutput::ZERO);
        assert_eq!(engine.execute(&quiet(-0.05)), TickOutput::ZERO);
        assert_eq!(engine.tick_count(), 3);
        assert_eq!(engine.cursor(Direction::OneToTwo), 3);
        assert_eq!(engine.mode(), CouplingMode::Coupled);
    }

    #[test]
    fn test_unpause_restarts_episode() {
        let mut engine = engine();
        engine.execute(&TickInput::new(0.0, 0.0, true, false));
        for _ in 0..9 {
            engine.execute(&quiet(0.0));
        }
        engine.pause();
        engine.unpause();

        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.elapsed_time(), 0.0);
        engine.execute(&quiet(0.0));
        assert_eq!(engine.elapsed_time(), 0.0);
        engine.execute(&quiet(0.0));
        assert_eq!(engine.elapsed_time(), DT);
    }

    #[test]
    fn test_reconfigure_rejects_without_side_effects() {
        let mut engine = engine();
        let before = engine.profile(Direction::OneToTwo).clone();

        let mut bad = EngineSettings::default();
        bad.synapse_1_2.tau = -1.0;
        assert!(engine.reconfigure(bad).is_err());

        let mut too_long = EngineSettings::default();
        too_long.synapse_2_1.tau = 1_000.0;
        assert!(matches!(
            engine.reconfigure(too_long),
            Err(EngineError::Synapse {
                direction: Direction::TwoToOne,
                ..
            })
        ));

        assert_eq!(engine.profile(Direction::OneToTwo), &before);
        assert_eq!(engine.settings(), &EngineSettings::default());
    }

    #[test]
    fn test_reconfigure_reversal_only_keeps_profile() {
        let mut engine = engine();
        let mut settings = EngineSettings::default();
        settings.synapse_1_2.e_syn = 0.0;
        engine.reconfigure(settings).unwrap();
        assert_eq!(engine.settings().synapse_1_2.e_syn, 0.0);
        assert_eq!(engine.profile(Direction::OneToTwo).len(), 1001);
    }

    #[test]
    fn test_period_event_rebuilds_profiles() {
        let mut engine = engine();
        engine.set_coupled(true);
        for _ in 0..4 {
            engine.execute(&quiet(-0.05));
        }

        engine.update(HostEvent::Period { period_ns: 50_000 }).unwrap();
        assert_eq!(engine.dt(), 5e-5);
        assert_eq!(engine.profile(Direction::TwoToOne).len(), 2001);
        assert_eq!(engine.output(), TickOutput::ZERO);
        assert_eq!(engine.cursor(Direction::OneToTwo), 4);
        assert_eq!(engine.mode(), CouplingMode::Coupled);

        assert!(engine.update(HostEvent::Period { period_ns: 0 }).is_err());
        assert_eq!(engine.dt(), 5e-5);
    }

    #[test]
    fn test_rejected_period_still_silences_outputs() {
        let mut engine = engine();
        engine.set_coupled(true);
        for _ in 0..4 {
            engine.execute(&quiet(-0.05));
        }
        assert_ne!(engine.output(), TickOutput::ZERO);

        assert!(matches!(
            engine.update(HostEvent::Period { period_ns: 0 }),
            Err(EngineError::Period(_))
        ));
        assert_eq!(engine.output(), TickOutput::ZERO);
        assert_eq!(engine.dt(), DT);
        assert_eq!(engine.cursor(Direction::OneToTwo), 4);
    }

    #[test]
    fn test_new_rejects_bad_period() {
        assert!(matches!(
            CouplingEngine::new(EngineSettings::default(), 0.0),
            Err(EngineError::Period(_))
        ));
        assert!(CouplingEngine::new(EngineSettings::default(), f64::NAN).is_err());
    }

    #[test]
    fn test_from_config_switches() {
        let mut config = CouplingConfig::default();
        config.coupling.automate = true;
        config.coupling.start_coupled = true;
        config.host.period_ns = 200_000;

        let engine = CouplingEngine::from_config(&config).unwrap();
        assert!(engine.is_automated());
        assert!(engine.is_coupled());
        assert_eq!(engine.dt(), 2e-4);
    }

    #[test]
    fn test_apply_commands() {
        let mut engine = engine();
        engine.apply(EngineCommand::SetAutomate(true)).unwrap();
        engine.apply(EngineCommand::SetCoupled(true)).unwrap();
        engine.apply(EngineCommand::Host(HostEvent::Pause)).unwrap();
        assert!(engine.is_automated());
        assert!(engine.is_coupled());
        assert!(engine.is_paused());

        engine.apply(EngineCommand::Host(HostEvent::Unpause)).unwrap();
        assert!(!engine.is_paused());
    }
}
