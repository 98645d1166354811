//! File-backed `tracing` setup.
//!
//! The terminal belongs to the TUI while it runs, so log lines go to a file
//! instead of stderr. `RUST_LOG` overrides `log.level` from the config.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};
use crate::error::{GuildError, Result};

/// Install the global subscriber and return the log file path.
pub fn init(settings: &LogSettings) -> Result<PathBuf> {
    let path = settings
        .file
        .clone()
        .or_else(default_log_path)
        .ok_or_else(|| GuildError::Config("no log file path (HOME unset)".to_string()))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| GuildError::Config(format!("logging already initialised: {e}")))?;

    Ok(path)
}
