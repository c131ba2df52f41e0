//! Publishing destination adapters

mod gist;
mod notion;
mod telegram;

use devdiary_core::ports::{DestinationKind, PublishError};
use reqwest::StatusCode;
use tracing::{error, warn};

pub use gist::{GistAdapter, DEFAULT_GIST_FILENAME};
pub use notion::{NotionAdapter, NOTION_VERSION};
pub use telegram::{format_summary_message, TelegramAdapter};

/// Maps a non-success HTTP status to the matching `PublishError`
pub(crate) fn error_for_status(
    kind: DestinationKind,
    status: StatusCode,
    body: String,
) -> PublishError {
    match status.as_u16() {
        401 | 403 => {
            error!(destination = %kind, "Destination rejected credentials");
            PublishError::Unauthorized(kind)
        }
        429 => {
            warn!(destination = %kind, "Destination rate limit exceeded");
            PublishError::RateLimited(kind)
        }
        _ => {
            error!(destination = %kind, status = %status, body = %body, "Destination error");
            PublishError::RequestFailed(kind, format!("{}: {}", status, body))
        }
    }
}

pub(crate) fn transport_error(kind: DestinationKind, e: reqwest::Error) -> PublishError {
    error!(destination = %kind, error = %e, "Failed to reach destination");
    PublishError::RequestFailed(kind, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        assert!(matches!(
            error_for_status(DestinationKind::Notion, StatusCode::UNAUTHORIZED, String::new()),
            PublishError::Unauthorized(DestinationKind::Notion)
        ));
        assert!(matches!(
            error_for_status(DestinationKind::Github, StatusCode::TOO_MANY_REQUESTS, String::new()),
            PublishError::RateLimited(DestinationKind::Github)
        ));
        let err = error_for_status(
            DestinationKind::Telegram,
            StatusCode::BAD_REQUEST,
            "chat not found".to_string(),
        );
        assert!(err.to_string().contains("chat not found"));
    }
}
