//! OpenAI-compatible chat completions adapter

use async_trait::async_trait;
use devdiary_core::ports::{AIError, AIProviderPort, CompletionRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{error_for_status, http_client};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo";

const OPENAI_API_BASE: &str = "https://api.openai.com";
const PROVIDER: &str = "openai";

pub struct OpenAIAdapter {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIAdapter {
    /// An empty `model` selects [`DEFAULT_OPENAI_MODEL`].
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client: http_client(),
            api_key: api_key.into(),
            model: if model.trim().is_empty() {
                DEFAULT_OPENAI_MODEL.to_string()
            } else {
                model
            },
            base_url: OPENAI_API_BASE.to_string(),
        }
    }

    /// Any server speaking the chat completions protocol
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system_prompt,
                },
                Message {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }
}

#[async_trait]
impl AIProviderPort for OpenAIAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
        debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(&request))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send chat completion request");
                AIError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_for_status(PROVIDER, status, error_body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse chat completion response");
            AIError::InvalidResponse(e.to_string())
        })?;

        match parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(text) if !text.trim().is_empty() => {
                debug!(text_length = text.len(), "Received chat completion");
                Ok(text)
            }
            _ => Err(AIError::EmptyCompletion(PROVIDER.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
