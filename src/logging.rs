use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{ReconcileError, Result};

const DEFAULT_DIRECTIVE: &str = "ev_reconcile=info";

/// Initializes console and daily-rotated JSON file logging under `log_dir`.
///
/// `RUST_LOG` overrides the default `ev_reconcile=info` filter. Keep the
/// returned guard alive until exit so buffered file logs are flushed.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "reconcile.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Console goes to stderr; stdout carries the run report.
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ReconcileError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
