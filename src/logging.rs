//! File logging setup.
//!
//! Log lines are plain text in `<log dir>/app.YYYY-MM-DD.log`. A new file is
//! started at midnight (UTC) and a year of files is kept.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::fs::ensure_dir;

pub const LOG_FILE_PREFIX: &str = "app";
pub const LOG_FILE_SUFFIX: &str = "log";
/// Daily files kept before the oldest is deleted.
pub const MAX_LOG_FILES: usize = 365;

/// Builds the filter for our own crate at `level`, keeping dependencies at `warn`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(format!("warn,agent_chat={level}"))
        .with_context(|| format!("Invalid log level: '{level}'"))
}

/// Opens the daily-rotating log file in `dir`, creating the directory.
pub fn appender(dir: &Path) -> Result<RollingFileAppender> {
    ensure_dir(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

/// Installs the global subscriber writing to the rotating log in `dir`.
///
/// Lines are written from a background thread; keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init(dir: &Path, level: &str) -> Result<WorkerGuard> {
    let filter = env_filter(level)?;
    let (writer, guard) = tracing_appender::non_blocking(appender(dir)?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
