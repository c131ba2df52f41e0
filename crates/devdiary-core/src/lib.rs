//! DevDiary Core - Domain logic for the developer diary pipeline
//!
//! Language detection, clipboard capture, activity collection, diary
//! generation and publishing. External systems are reached only through the
//! port traits in [`ports`]; concrete adapters live in `devdiary-adapters`.

pub mod api_key;
pub mod clipboard;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod exporter;
pub mod generator;
pub mod insights;
pub mod language;
pub mod logging;
pub mod ports;
pub mod prompt;
pub mod publisher;
pub mod scheduler;

pub use api_key::{Credential, CredentialManager, MissingCredential, SecretApiKey};
pub use clipboard::{ClipboardWatcher, SnippetListener, WatcherRegistry, WatcherState};
pub use collector::ActivityCollector;
pub use config::{
    get_default_config_path, load_config, load_config_from_path, AiConfig, Config,
    SnippetsConfig, StorageConfig,
};
pub use coordinator::{DiaryCoordinator, DiaryRun, RunError};
pub use directory::DirectoryManager;
pub use error::{ConfigError, DiaryError};
pub use exporter::{DiaryExporter, ExportedDiary};
pub use generator::{DiaryGenerator, GenerateError, GenerationSettings};
pub use insights::SnippetInsights;
pub use language::Language;
pub use logging::{init_logger, LogLevel, LoggerConfig, LoggerError, LoggerGuard};
pub use prompt::PromptBuilder;
pub use publisher::{
    ChatNotifierDestination, Destination, DocumentDatabaseDestination, GistHostDestination,
    PublishCoordinator,
};
pub use scheduler::{DiaryScheduler, SchedulerError};
