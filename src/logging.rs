//! File logging via `tracing` and `tracing-subscriber`.
//!
//! The terminal is owned by the TUI, so logs only ever go to a file and
//! only when asked for (`--log-file` or `WORDRUSH_LOG`).

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app_dirs::AppDirs;

/// Env var enabling logging to the default state-dir log file
pub const LOG_ENV: &str = "WORDRUSH_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub log_file: PathBuf,
}

impl LogConfig {
    /// Resolve logging from an explicit path or the environment; `None`
    /// leaves logging off.
    pub fn resolve(log_file: Option<PathBuf>) -> Option<Self> {
        let env_level = std::env::var(LOG_ENV).ok();
        let log_file = log_file.or_else(|| env_level.as_ref().and(AppDirs::log_path()))?;
        let level = env_level
            .as_deref()
            .and_then(|lvl| lvl.parse::<Level>().ok())
            .unwrap_or(Level::DEBUG);
        Some(Self { level, log_file })
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,wordrush={level}",
            level = config.level.as_str().to_lowercase()
        ))
    });

    let layer = fmt::layer()
        .compact()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(io::Error::other)
}
