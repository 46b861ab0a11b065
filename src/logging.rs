//! Structured logging setup with tracing
//!
//! The terminal belongs to the UI, so everything goes to a daily rolling file.

use crate::error::{CullError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("blinkcull").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize the logging system.
///
/// `RUST_LOG` wins over `default_level`. The returned guard flushes the
/// background writer on drop and must be held until the program exits.
pub fn init_logging(dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "blinkcull.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| CullError::Logging(e.to_string()))?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}
