//! System clipboard port definition

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while reading the clipboard
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The host refused clipboard access
    #[error("Clipboard permission denied")]
    PermissionDenied,

    /// No clipboard is available in this environment
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard read failed: {0}")]
    ReadFailed(String),
}

/// Port for reading the system clipboard
#[async_trait]
pub trait ClipboardReaderPort: Send + Sync {
    /// Current clipboard text; `Ok(None)` when it holds no text.
    async fn read_text(&self) -> Result<Option<String>, ClipboardError>;
}
