use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "TUTOR_LOG";
const LOG_FILE_NAME: &str = "tutor.log";

/// Keeps the background log writer alive; logs stop flushing once dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Logs go to a file because the terminal UI owns stdout.
pub fn init_tracing(log_dir: &Path) -> Result<FileLogGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(FileLogGuard { _guard: guard })
}
