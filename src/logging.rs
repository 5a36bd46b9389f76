//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use crate::error::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Effective level from the configured default and the `-v`/`-q` flags
pub fn log_level(config: &LoggingConfig, verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => config.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Path of the per-run log file
pub fn log_file_path(log_dir: &Path, run_stamp: &str) -> PathBuf {
    log_dir.join(format!("cruise_dateparse_{}.log", run_stamp))
}

/// Install the global subscriber.
///
/// Returns the log file path when a file sink was opened.
pub fn init(
    config: &LoggingConfig,
    log_dir: &Path,
    run_stamp: &str,
    verbose: u8,
    quiet: bool,
) -> Result<Option<PathBuf>> {
    let level = log_level(config, verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cruise_dateparse={}", level)));

    let console = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);

    let (file_layer, path) = if config.log_file {
        fs::create_dir_all(log_dir)?;
        let path = log_file_path(log_dir, run_stamp);
        let file = File::create(&path)?;
        let layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    debug!("Logging initialized at level: {}", level);
    Ok(path)
}
