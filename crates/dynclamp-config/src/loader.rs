// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, CouplingConfig, LogFormat, SynapseSection};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "dynclamp.toml";

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "DYNCLAMP_CONFIG_PATH";

/// Find the dynclamp configuration file
///
/// Search order:
/// 1. `DYNCLAMP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./dynclamp.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by {} not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Range validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CouplingConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: CouplingConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "text" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

/// Overwrite `target` when `raw` parses; unparseable overrides are ignored
fn set_parsed<T: FromStr>(target: &mut T, raw: Option<String>) {
    if let Some(parsed) = raw.and_then(|v| v.trim().parse::<T>().ok()) {
        *target = parsed;
    }
}

/// Setting keys shared by the environment and CLI layers.
///
/// The environment variable name is `DYNCLAMP_` + the upper-cased key.
fn apply_overrides_with<F>(config: &mut CouplingConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    set_parsed(&mut config.coupling.delay_ms, lookup("coupling_delay_ms"));
    set_parsed(&mut config.coupling.tolerance_ms, lookup("tolerance_ms"));
    if let Some(value) = lookup("automate") {
        config.coupling.automate = parse_bool(&value);
    }
    if let Some(value) = lookup("start_coupled") {
        config.coupling.start_coupled = parse_bool(&value);
    }

    apply_synapse_overrides(&mut config.synapse_1_2, "1_2", &lookup);
    apply_synapse_overrides(&mut config.synapse_2_1, "2_1", &lookup);

    set_parsed(&mut config.host.period_ns, lookup("period_ns"));

    if let Some(value) = lookup("log_level") {
        config.logging.level = value;
    }
    if let Some(format) = lookup("log_format").as_deref().and_then(parse_log_format) {
        config.logging.format = format;
    }
}

fn apply_synapse_overrides<F>(synapse: &mut SynapseSection, suffix: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    set_parsed(&mut synapse.gmax_ns, lookup(&format!("gmax_{}_ns", suffix)));
    set_parsed(&mut synapse.tau_ms, lookup(&format!("tau_{}_ms", suffix)));
    set_parsed(&mut synapse.esyn_mv, lookup(&format!("esyn_{}_mv", suffix)));
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DYNCLAMP_COUPLING_DELAY_MS` -> `coupling.delay_ms`
/// - `DYNCLAMP_TOLERANCE_MS` -> `coupling.tolerance_ms`
/// - `DYNCLAMP_AUTOMATE` -> `coupling.automate`
/// - `DYNCLAMP_START_COUPLED` -> `coupling.start_coupled`
/// - `DYNCLAMP_GMAX_1_2_NS`, `DYNCLAMP_TAU_1_2_MS`, `DYNCLAMP_ESYN_1_2_MV` -> `synapse_1_2.*`
/// - `DYNCLAMP_GMAX_2_1_NS`, `DYNCLAMP_TAU_2_1_MS`, `DYNCLAMP_ESYN_2_1_MV` -> `synapse_2_1.*`
/// - `DYNCLAMP_PERIOD_NS` -> `host.period_ns`
/// - `DYNCLAMP_LOG_LEVEL` -> `logging.level`
/// - `DYNCLAMP_LOG_FORMAT` -> `logging.format`
pub fn apply_environment_overrides(config: &mut CouplingConfig) {
    apply_overrides_with(config, |key| {
        env::var(format!("DYNCLAMP_{}", key.to_uppercase())).ok()
    });
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"tau_1_2_ms": "20", "automate": "true"}`)
pub fn apply_cli_overrides(config: &mut CouplingConfig, cli_args: &HashMap<String, String>) {
    apply_overrides_with(config, |key| cli_args.get(key).cloned());
}
