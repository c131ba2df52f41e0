//! Common error types for DevDiary
//!
//! Each port defines its own error enum. [`DiaryError`] wraps them so callers
//! can propagate any of them with `?`.

use thiserror::Error;

pub use crate::api_key::MissingCredential;
pub use crate::generator::GenerateError;
pub use crate::logging::LoggerError;
pub use crate::ports::ai::AIError;
pub use crate::ports::clipboard::ClipboardError;
pub use crate::ports::publish::PublishError;
pub use crate::ports::snippet::SnippetStoreError;
pub use crate::ports::vcs::VcsError;

/// Top-level error type for DevDiary operations
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] MissingCredential),

    #[error("AI error: {0}")]
    AI(#[from] AIError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Snippet store error: {0}")]
    SnippetStore(#[from] SnippetStoreError),

    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Logger error: {0}")]
    Logger(#[from] LoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
