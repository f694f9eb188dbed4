//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging options consumed by [`crate::init_logging`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingOptions {
    /// Level for every target not raised by a debug flag (trace, debug, info, warn, error)
    pub default_level: String,

    /// Console format
    pub format: LogFormat,

    /// Optional JSON file output (requires the `file-logging` feature)
    pub file: Option<FileLoggingOptions>,
}

/// File output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLoggingOptions {
    /// Base directory; each run writes into `run_<timestamp>/` below it
    pub log_dir: PathBuf,

    /// Delete run folders older than this many days
    pub retention_days: u64,

    /// Keep at most this many run folders
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        LoggingOptions {
            default_level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl Default for FileLoggingOptions {
    fn default() -> Self {
        FileLoggingOptions {
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
