use std::{env, fs, io, path::Path};

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT_VAR: &str = "CFG_MANAGER_LOG_FORMAT";
const LOG_FILES_TO_KEEP: usize = 7;

/// Console output format, chosen through `CFG_MANAGER_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output (default)
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Reads the format from the environment, defaulting to [`LogFormat::Pretty`].
    pub fn from_env() -> Self {
        match env::var(LOG_FORMAT_VAR).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for the application
///
/// Uses RUST_LOG if set, otherwise logs at info level.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()?,
    }

    Ok(())
}

/// Initialize tracing with an additional daily rolling log file in `log_dir`.
///
/// The returned guard flushes the file writer on drop and must be kept alive for as
/// long as logs should be written.
///
/// # Errors
/// Returns error if the log directory or file cannot be created, or if a global
/// subscriber is already installed
pub fn init_with_file(log_dir: &Path) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    fs::create_dir_all(log_dir)?;

    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_TO_KEEP)
        .filename_prefix("cfg-manager")
        .filename_suffix("log")
        .build(log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_writer(file_writer)
        .with_ansi(false);
    let registry = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(io::stdout))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true).with_writer(io::stdout))
            .try_init()?,
    }

    Ok(guard)
}
