//! File-based tracing. The terminal belongs to the UI, so nothing is ever
//! written to stdout or stderr once the session starts.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// `$XDG_STATE_HOME/encore/encore.log`, else `~/.local/state/encore/encore.log`.
pub fn default_log_path(state_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let state_home = match (state_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg),
        (_, Some(home)) => PathBuf::from(home).join(".local").join("state"),
        _ => return None,
    };
    Some(state_home.join("encore").join("encore.log"))
}

/// `RUST_LOG` wins over the configured directives; bad directives fall back to `info`.
pub fn build_filter(rust_log: Option<&str>, configured: &str) -> EnvFilter {
    rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(settings: &LoggingSettings) -> Result<WorkerGuard> {
    let path = settings
        .file
        .clone()
        .or_else(|| {
            default_log_path(
                std::env::var_os("XDG_STATE_HOME"),
                std::env::var_os("HOME"),
            )
        })
        .context("no log file configured and no HOME to derive one")?;
    let file = open_log_file(&path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let rust_log = std::env::var("RUST_LOG").ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(rust_log.as_deref(), &settings.filter))
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init();
    Ok(guard)
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
