//! System clipboard reader backed by arboard

use async_trait::async_trait;
use devdiary_core::ports::{ClipboardError, ClipboardReaderPort};

/// Reads text from the OS clipboard
///
/// A fresh handle is opened per read on a blocking thread; some platforms tie
/// the handle to the thread that created it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    /// True when a clipboard handle can be opened in this environment
    pub fn is_available() -> bool {
        arboard::Clipboard::new().is_ok()
    }
}

fn map_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("clipboard not supported".to_string())
        }
        arboard::Error::ClipboardOccupied => {
            ClipboardError::ReadFailed("clipboard occupied".to_string())
        }
        other => ClipboardError::ReadFailed(other.to_string()),
    }
}

#[async_trait]
impl ClipboardReaderPort for SystemClipboard {
    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            match clipboard.get_text() {
                Ok(text) => Ok(Some(text)),
                Err(arboard::Error::ContentNotAvailable) => Ok(None),
                Err(e) => Err(map_error(e)),
            }
        })
        .await
        .map_err(|e| ClipboardError::ReadFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error() {
        assert!(matches!(
            map_error(arboard::Error::ClipboardNotSupported),
            ClipboardError::Unavailable(_)
        ));
        assert!(matches!(
            map_error(arboard::Error::ClipboardOccupied),
            ClipboardError::ReadFailed(_)
        ));
    }

    #[tokio::test]
    #[ignore = "Requires a desktop session with a clipboard"]
    async fn test_read_system_clipboard() {
        let result = SystemClipboard::new().read_text().await;
        assert!(result.is_ok(), "read failed: {:?}", result.err());
    }
}
