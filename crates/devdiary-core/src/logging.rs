//! Logging infrastructure for DevDiary
//!
//! Structured logging via `tracing`, written to a daily-rolling file in the
//! logs directory and optionally mirrored to stdout.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Log file name prefix used by the daily appender
pub const DEFAULT_LOG_FILE: &str = "devdiary.log";

/// Target prefix used for the default filter directive
const LOG_TARGET: &str = "devdiary";

/// Errors that can occur during logger initialization
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(String),

    #[error("Failed to initialize logger: {0}")]
    InitializationFailed(String),

    #[error("Logger has already been initialized")]
    AlreadyInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Converts to tracing's LevelFilter
    pub fn to_level_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    fn directive(self) -> String {
        format!("{}={}", LOG_TARGET, self)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Configuration for the DevDiary logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Log level filter, overridden by `RUST_LOG` when set
    pub level: LogLevel,
    /// Whether to also log to stdout
    pub log_to_stdout: bool,
}

impl LoggerConfig {
    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            level: LogLevel::Info,
            log_to_stdout: false,
        }
    }

    /// Creates a LoggerConfig with the default log directory (~/.devdiary/logs/)
    pub fn with_default_dir() -> Self {
        let log_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".devdiary")
            .join("logs");
        Self::new(log_dir)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_stdout(mut self, enabled: bool) -> Self {
        self.log_to_stdout = enabled;
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path prefix of the rolling log file; the appender adds a date suffix.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(DEFAULT_LOG_FILE)
    }
}

/// Keeps the non-blocking writer alive; logs are flushed when dropped.
pub struct LoggerGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initializes the global subscriber
///
/// # Returns
/// A `LoggerGuard` that must be kept alive for the duration of the program.
///
/// # Errors
/// Returns `LoggerError` if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<LoggerGuard, LoggerError> {
    use std::fs;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if !config.log_dir.exists() {
        fs::create_dir_all(&config.log_dir).map_err(|e| {
            LoggerError::DirectoryCreationFailed(format!("{}: {}", config.log_dir.display(), e))
        })?;
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, DEFAULT_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Option<Layer> is itself a layer, so the stdout mirror can be toggled
    // without duplicating the registry chain.
    let stdout_layer = config.log_to_stdout.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LoggerError::InitializationFailed(e.to_string()))?;

    tracing::info!(
        log_dir = %config.log_dir.display(),
        level = %config.level,
        "DevDiary logger initialized"
    );

    Ok(LoggerGuard { _guard: guard })
}
