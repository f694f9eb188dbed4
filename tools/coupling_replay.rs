// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Offline replay of the coupling engine against synthetic spike trains.
//!
//! Drives the engine through a [`CouplingRunner`] exactly as a real-time host
//! would, and writes one CSV row per tick to stdout:
//!
//! ```text
//! tick,time_s,isyn_1_2,isyn_2_1,phase_diff_s,mode
//! ```
//!
//! Logs go to stderr, so the output can be piped straight into a plotting tool.

use std::collections::HashMap;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dynclamp::config::{
    find_config_file, load_config, validate_config, CouplingConfig, LogFormat as ConfigLogFormat,
};
use dynclamp::engine::{
    CouplingEngine, CouplingMode, CouplingRunner, EngineCommand, HostEvent, TickInput,
};
use dynclamp::observability::{
    init_logging, CrateDebugFlags, FileLoggingOptions, LogFormat, LoggingOptions, DEBUG_ENV,
};

/// Replay the two-cell coupling engine on synthetic spike trains
#[derive(Parser, Debug)]
#[command(name = "coupling_replay", version, author, long_about = None)]
struct Args {
    /// Config file (defaults to DYNCLAMP_CONFIG_PATH or a dynclamp.toml found nearby)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay length (ms)
    #[arg(long, default_value_t = 2000.0)]
    duration_ms: f64,

    /// Cell 1 firing rate (Hz); cell 2 fires at the same rate
    #[arg(long, default_value_t = 2.0)]
    rate_hz: f64,

    /// Cell 2 spike lag behind cell 1 (ms)
    #[arg(long, default_value_t = 187.5)]
    lag_ms: f64,

    /// Cell 1 membrane potential (mV)
    #[arg(long, default_value_t = -65.0)]
    vm1_mv: f64,

    /// Cell 2 membrane potential (mV)
    #[arg(long, default_value_t = -60.0)]
    vm2_mv: f64,

    /// Override host.period_ns
    #[arg(long)]
    period_ns: Option<u64>,

    /// Arm automatic coupling
    #[arg(long)]
    automate: bool,

    /// Start in the coupled state
    #[arg(long)]
    couple: bool,

    /// Pause the host at this time (ms)
    #[arg(long)]
    pause_at_ms: Option<f64>,

    /// Unpause this many ms after pausing
    #[arg(long, default_value_t = 100.0, requires = "pause_at_ms")]
    pause_for_ms: f64,

    /// Enable debug logging for a crate (repeatable, `all` for every crate)
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,

    /// Also write JSON logs below this directory (needs the `file-logging` feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    /// CLI layer of the configuration overrides
    fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(period_ns) = self.period_ns {
            overrides.insert("period_ns".to_string(), period_ns.to_string());
        }
        if self.automate {
            overrides.insert("automate".to_string(), "true".to_string());
        }
        if self.couple {
            overrides.insert("start_coupled".to_string(), "true".to_string());
        }
        overrides
    }

    fn debug_flags(&self) -> CrateDebugFlags {
        let mut flags = CrateDebugFlags::from_args(self.debug.iter().map(|name| {
            if name == "all" {
                "--debug-all".to_string()
            } else {
                format!("--debug-{}", name)
            }
        }));
        if let Ok(value) = std::env::var(DEBUG_ENV) {
            flags
                .enabled_crates
                .extend(CrateDebugFlags::from_env_value(&value).enabled_crates);
        }
        flags
    }
}

fn load(args: &Args) -> Result<CouplingConfig> {
    let overrides = args.config_overrides();
    let explicit = args.config.clone().or_else(|| find_config_file().ok());

    let config = match explicit {
        Some(path) => load_config(Some(&path), Some(&overrides))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let mut config = CouplingConfig::default();
            dynclamp::config::apply_environment_overrides(&mut config);
            dynclamp::config::apply_cli_overrides(&mut config, &overrides);
            config
        }
    };
    validate_config(&config)?;
    Ok(config)
}

fn ms_to_ticks(ms: f64, dt: f64) -> u64 {
    (ms * 1e-3 / dt).round().max(0.0) as u64
}

fn mode_label(mode: CouplingMode) -> &'static str {
    match mode {
        CouplingMode::Uncoupled => "uncoupled",
        CouplingMode::Coupled => "coupled",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load(&args)?;

    let logging = LoggingOptions {
        default_level: config.logging.level.clone(),
        format: match config.logging.format {
            ConfigLogFormat::Text => LogFormat::Text,
            ConfigLogFormat::Json => LogFormat::Json,
        },
        file: args.log_dir.clone().map(|log_dir| FileLoggingOptions {
            log_dir,
            ..FileLoggingOptions::default()
        }),
    };
    let _guard = init_logging(&args.debug_flags(), &logging)?;

    let engine = CouplingEngine::from_config(&config)?;
    for (name, value) in engine.parameters().named_values() {
        info!("{} = {}", name, value);
    }
    let dt = engine.dt();
    let mut runner = CouplingRunner::new(engine);
    let queue = runner.queue();
    queue.push(EngineCommand::Host(HostEvent::Init));

    let total_ticks = ms_to_ticks(args.duration_ms, dt);
    let spike_period = if args.rate_hz > 0.0 {
        ms_to_ticks(1000.0 / args.rate_hz, dt).max(1)
    } else {
        u64::MAX
    };
    let lag = ms_to_ticks(args.lag_ms, dt) % spike_period;
    let pause_window = args.pause_at_ms.map(|at| {
        let start = ms_to_ticks(at, dt);
        (start, start + ms_to_ticks(args.pause_for_ms, dt))
    });

    info!(
        "Replaying {} ticks at dt={:.3e}s: spike period {} ticks, cell 2 lag {} ticks",
        total_ticks, dt, spike_period, lag
    );

    let vm1 = args.vm1_mv * 1e-3;
    let vm2 = args.vm2_mv * 1e-3;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "tick,time_s,isyn_1_2,isyn_2_1,phase_diff_s,mode")?;

    let mut coupled_at = None;
    for tick in 0..total_ticks {
        if let Some((start, end)) = pause_window {
            if tick == start {
                queue.push(EngineCommand::Host(HostEvent::Pause));
            } else if tick == end {
                queue.push(EngineCommand::Host(HostEvent::Unpause));
            }
        }

        let input = TickInput::new(
            vm1,
            vm2,
            tick % spike_period == 0,
            tick >= lag && (tick - lag) % spike_period == 0,
        );
        let output = runner.tick(&input);
        let engine = runner.engine();

        if coupled_at.is_none() && engine.is_coupled() {
            coupled_at = Some(tick);
        }

        let state = engine.state();
        writeln!(
            out,
            "{},{:.7},{:e},{:e},{:.7},{}",
            tick,
            state.elapsed_time,
            output.isyn_1_2,
            output.isyn_2_1,
            state.phase_difference,
            mode_label(engine.mode())
        )?;
    }
    out.flush()?;

    match coupled_at {
        Some(tick) => info!("Coupled from tick {}", tick),
        None if runner.engine().is_automated() => {
            warn!("Automation armed but the phase never entered the coupling window")
        }
        None => info!("Replay finished uncoupled"),
    }
    Ok(())
}
