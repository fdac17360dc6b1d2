//! Tracing setup for the `pluck` binary.
//!
//! Events go to stderr unless `--log-file` asks for the append-only log at
//! `$XDG_STATE_HOME/pluck/pluck.log`. `RUST_LOG` overrides the default filter
//! in both cases.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "pluck.log";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// `$XDG_STATE_HOME/pluck/pluck.log`, creating the `pluck` directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pluck")?;
    xdg_dirs
        .place_state_file(LOG_FILE_NAME)
        .context("failed to create log directory")
}

/// Opens `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Sends log events to [`log_file_path`]. Returns the path written to.
///
/// Fails when the file cannot be opened or a subscriber is already set; the
/// caller then falls back to [`init_logging_stderr`].
pub fn init_logging_file(default_filter: &str) -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = open_log_file(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::debug!(path = %path.display(), "logging to file");
    Ok(path)
}

pub fn init_logging_stderr(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
