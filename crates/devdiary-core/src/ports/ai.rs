//! Generative backend port definition

use async_trait::async_trait;
use thiserror::Error;

/// One text completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Instructional system prompt
    pub system_prompt: String,
    /// User prompt carrying the content to work on
    pub user_prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Errors that can occur during backend calls
#[derive(Debug, Error)]
pub enum AIError {
    /// API key is missing or invalid
    #[error("Unauthorized: API key is missing or invalid. Please set the appropriate environment variable (GEMINI_API_KEY or OPENAI_API_KEY)")]
    Unauthorized,

    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-specific error
    #[error("Provider '{0}' error: {1}")]
    ProviderError(String, String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The backend answered but produced no text
    #[error("Empty completion from provider '{0}'")]
    EmptyCompletion(String),
}

/// Port for generative text backends
#[async_trait]
pub trait AIProviderPort: Send + Sync {
    /// Short provider name for logs and error messages
    fn name(&self) -> &str;

    /// Produces markdown text for the given prompts
    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError>;
}
