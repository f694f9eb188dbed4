//! End-to-end runs: configuration file -> engine -> runner -> published state

use std::fs;
use std::sync::Arc;

use dynclamp::config::{load_config, CouplingConfig};
use dynclamp::prelude::*;
use parking_lot::Mutex;
use tempfile::tempdir;

const RIG_CONFIG: &str = r#"
[coupling]
delay_ms = 50.0
tolerance_ms = 2.0
automate = true

[synapse_1_2]
gmax_ns = 0.5
tau_ms = 5.0
esyn_mv = 0.0

[synapse_2_1]
gmax_ns = 0.2
tau_ms = 20.0
esyn_mv = -80.0

[host]
period_ns = 50000
"#;

fn engine_from_toml(toml: &str) -> CouplingEngine {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dynclamp.toml");
    fs::write(&path, toml).unwrap();
    let config = load_config(Some(&path), None).unwrap();
    CouplingEngine::from_config(&config).unwrap()
}

/// Cell 1 every `period` ticks from tick 0, cell 2 `lag` ticks later
fn alternating(period: u64, lag: u64, tick: u64) -> TickInput {
    TickInput::new(
        -0.065,
        -0.060,
        tick % period == 0,
        tick >= lag && (tick - lag) % period == 0,
    )
}

#[test]
fn rig_config_is_converted_to_si() {
    let engine = engine_from_toml(RIG_CONFIG);
    assert!(engine.is_automated());
    assert!(!engine.is_coupled());
    assert!((engine.dt() - 5e-5).abs() < 1e-18);

    let settings = engine.settings();
    assert!((settings.coupling_delay - 0.050).abs() < 1e-12);
    assert!((settings.synapse_1_2.g_max - 0.5e-9).abs() < 1e-20);
    assert!((settings.synapse_2_1.e_syn + 0.080).abs() < 1e-12);

    // 10 τ at 50 µs: 5 ms -> 1001 samples, 20 ms -> 4001 samples
    assert_eq!(engine.profile(Direction::OneToTwo).len(), 1001);
    assert_eq!(engine.profile(Direction::TwoToOne).len(), 4001);
}

#[test]
fn automation_couples_once_phase_reaches_delay() {
    let engine = engine_from_toml(RIG_CONFIG);
    let mut runner = CouplingRunner::new(engine);

    // 50 ms lag at 50 µs ticks, cells firing every 200 ms
    let (period, lag) = (4000, 1000);
    let mut coupled_at = None;
    for tick in 0..period {
        let out = runner.tick(&alternating(period, lag, tick));
        if runner.engine().is_coupled() && coupled_at.is_none() {
            coupled_at = Some(tick);
            assert_eq!(out, TickOutput::ZERO);
        }
    }
    assert_eq!(coupled_at, Some(lag));

    // Next cycle: the cell 1 spike drives cell 2 through the 1-2 synapse
    let mut peak = 0.0f64;
    for tick in period..period + 400 {
        let out = runner.tick(&alternating(period, lag, tick));
        peak = peak.max(out.isyn_1_2);
    }
    // g reaches -g_max at t = τ; driving force Vm2 - Esyn = -60 mV
    let expected_peak = -0.5e-9 * (-0.060 - 0.0);
    assert!((peak - expected_peak).abs() < expected_peak * 1e-9);
}

#[test]
fn operator_commands_flow_through_queue() {
    let mut runner = CouplingRunner::new(CouplingEngine::from_config(&CouplingConfig::default()).unwrap());
    let states: Arc<Mutex<Vec<PublishedState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    runner = runner.with_publisher(Arc::new(move |state: &PublishedState| -> Result<(), String> {
        sink.lock().push(*state);
        Ok(())
    }));

    let operator = runner.queue();
    let producer = std::thread::spawn(move || {
        operator.push(EngineCommand::SetCoupled(true));
        operator.push(EngineCommand::Host(HostEvent::Modify(EngineSettings {
            coupling_delay: 0.2,
            ..EngineSettings::default()
        })));
    });
    producer.join().unwrap();

    runner.tick(&TickInput::new(-0.065, -0.060, true, false));
    assert!(runner.engine().is_coupled());
    assert_eq!(runner.engine().settings().coupling_delay, 0.2);

    for _ in 0..9 {
        runner.tick(&TickInput::default());
    }
    runner.queue().push(EngineCommand::Host(HostEvent::Pause));
    let paused = runner.tick(&TickInput::new(-0.065, -0.060, true, true));
    assert_eq!(paused, TickOutput::ZERO);

    runner.queue().push(EngineCommand::Host(HostEvent::Unpause));
    runner.tick(&TickInput::default());

    let states = states.lock();
    assert_eq!(states.len(), 12);
    assert!((states[9].elapsed_time - 9.0 * 1e-4).abs() < 1e-12);
    // Paused tick republishes the held state
    assert_eq!(states[10], states[9]);
    assert_eq!(states[11].elapsed_time, 0.0);
}

#[test]
fn invalid_reconfiguration_keeps_running_engine() {
    let mut runner = CouplingRunner::new(CouplingEngine::from_config(&CouplingConfig::default()).unwrap());
    runner.engine_mut().set_coupled(true);

    let mut broken = EngineSettings::default();
    broken.synapse_1_2.g_max = -1.0;
    runner.queue().push(EngineCommand::Host(HostEvent::Modify(broken)));

    let errors = runner.apply_pending();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], EngineError::Synapse { direction: Direction::OneToTwo, .. }));
    assert_eq!(runner.engine().settings(), &EngineSettings::default());
    assert!(runner.engine().is_coupled());
}
