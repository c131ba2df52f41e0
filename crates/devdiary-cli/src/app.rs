//! Application initialization and lifecycle management
//!
//! Provides the initialization sequence shared by every command and the
//! fatal error handling of the DevDiary CLI.

use anyhow::{Context, Result};
use devdiary_core::{
    get_default_config_path, init_logger, load_config_from_path, Config, CredentialManager,
    DirectoryManager, LogLevel, LoggerConfig, LoggerGuard,
};
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Application context holding initialized components
pub struct AppContext {
    /// Application configuration
    pub config: Arc<Config>,
    /// Data directory layout
    pub dirs: DirectoryManager,
    /// Credentials resolved from the environment
    pub credentials: CredentialManager,
    /// Logger guard (keeps logger alive)
    #[allow(dead_code)]
    logger_guard: Option<LoggerGuard>,
}

impl AppContext {
    /// Returns reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Application initialization options
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Configuration file; `~/.devdiary/config.toml` when absent
    pub config_path: Option<PathBuf>,
    /// Whether to initialize the logger
    pub init_logger: bool,
    /// Debug level plus stdout logging
    pub verbose: bool,
}

impl InitOptions {
    /// Options for a regular command run
    pub fn command(config_path: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            config_path,
            init_logger: true,
            verbose,
        }
    }

    fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

/// Initializes the DevDiary application
///
/// This function performs the following initialization sequence:
/// 1. Load configuration (`~/.devdiary/config.toml` unless overridden)
/// 2. Initialize directory structure (`<data_dir>/`, `diaries/`, `logs/`)
/// 3. Initialize logging (if requested)
/// 4. Set up panic hook for fatal error handling
pub fn initialize(options: InitOptions) -> Result<AppContext> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(get_default_config_path);
    let config = load_config_from_path(&config_path).context("Failed to load configuration")?;
    let config = Arc::new(config);

    let dirs = DirectoryManager::new(config.storage.data_dir.clone());
    dirs.initialize()
        .context("Failed to create directory structure")?;

    let logger_guard = if options.init_logger {
        let logger_config = LoggerConfig::new(dirs.logs_dir())
            .with_level(options.log_level())
            .with_stdout(options.verbose);

        Some(init_logger(logger_config).context("Failed to initialize logger")?)
    } else {
        None
    };

    setup_panic_hook(dirs.logs_dir());

    Ok(AppContext {
        config,
        dirs,
        credentials: CredentialManager::from_env(),
        logger_guard,
    })
}

/// Sets up a custom panic hook that logs the panic and points the user at
/// the log directory before the default hook runs.
fn setup_panic_hook(logs_dir: PathBuf) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        error!("FATAL ERROR at {}: {}", location, message);

        eprintln!();
        eprintln!("DevDiary encountered a fatal error and must exit.");
        eprintln!("Location: {}", location);
        eprintln!("Error: {}", message);
        eprintln!();
        eprintln!("Please check the log files in: {}", logs_dir.display());
        eprintln!();

        default_hook(panic_info);
    }));
}
