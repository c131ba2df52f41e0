//! Generative backend adapters
//!
//! Gemini and OpenAI-compatible chat completion clients implementing
//! `AIProviderPort`. Each adapter performs a single attempt per call.

mod gemini;
mod openai;

use std::time::Duration;

use devdiary_core::ports::AIError;
use reqwest::{Client, StatusCode};
use tracing::{error, warn};

pub use gemini::{GeminiAdapter, DEFAULT_GEMINI_MODEL};
pub use openai::{OpenAIAdapter, DEFAULT_OPENAI_MODEL};

const REQUEST_TIMEOUT_SECS: u64 = 120;

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Maps a non-success HTTP status to the matching `AIError`
pub(crate) fn error_for_status(provider: &str, status: StatusCode, body: String) -> AIError {
    match status.as_u16() {
        401 | 403 => {
            error!(provider, "Backend authentication failed");
            AIError::Unauthorized
        }
        429 => {
            warn!(provider, "Backend rate limit exceeded");
            AIError::RateLimitExceeded
        }
        400 => {
            error!(provider, body = %body, "Backend rejected request");
            AIError::InvalidRequest(body)
        }
        _ => {
            error!(provider, status = %status, body = %body, "Backend error");
            AIError::ProviderError(provider.to_string(), body)
        }
    }
}
