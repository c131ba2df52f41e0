//! Gemini API adapter

use async_trait::async_trait;
use devdiary_core::ports::{AIError, AIProviderPort, CompletionRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{error_for_status, http_client};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const PROVIDER: &str = "gemini";

/// Harm categories relaxed so code and incident write-ups are not blocked
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAdapter {
    /// An empty `model` selects [`DEFAULT_GEMINI_MODEL`].
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client: http_client(),
            api_key: api_key.into(),
            model: if model.trim().is_empty() {
                DEFAULT_GEMINI_MODEL.to_string()
            } else {
                model
            },
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Points the adapter at another host, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// System and user prompts travel as one user turn.
    fn build_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let text = if request.system_prompt.is_empty() {
            request.user_prompt.clone()
        } else {
            format!("{}\n\n{}", request.system_prompt, request.user_prompt)
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl AIProviderPort for GeminiAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
        let body = self.build_request(&request);
        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Gemini API");
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

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini API response");
            AIError::InvalidResponse(e.to_string())
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AIError::EmptyCompletion(PROVIDER.to_string()));
        }

        debug!(text_length = text.len(), "Received response from Gemini API");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are a diary assistant.".to_string(),
            user_prompt: "Summarize today.".to_string(),
            temperature: 0.7,
            max_output_tokens: 4000,
        }
    }

    const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash-latest:generateContent";

    #[test]
    fn test_default_model() {
        assert_eq!(GeminiAdapter::new("k", "").model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(GeminiAdapter::new("k", "gemini-pro").model(), "gemini-pro");
    }

    #[test]
    fn test_build_request_shape() {
        let adapter = GeminiAdapter::new("k", "");
        let json = serde_json::to_value(adapter.build_request(&request())).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "You are a diary assistant.\n\nSummarize today."
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4000);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"generationConfig": {"maxOutputTokens": 4000}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "# Dev Diary\n\n"}, {"text": "Shipped it."}], "role": "model"},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new("test-key", "").with_base_url(server.uri());
        let text = adapter.complete(request()).await.unwrap();
        assert_eq!(text, "# Dev Diary\n\nShipped it.");
    }

    #[tokio::test]
    async fn test_complete_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new("k", "").with_base_url(server.uri());
        assert!(matches!(
            adapter.complete(request()).await,
            Err(AIError::RateLimitExceeded)
        ));
    }

    #[tokio::test]
    async fn test_blocked_candidate_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"candidates": [{"finishReason": "SAFETY"}]})),
            )
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new("k", "").with_base_url(server.uri());
        assert!(matches!(
            adapter.complete(request()).await,
            Err(AIError::EmptyCompletion(p)) if p == "gemini"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_failed() {
        let adapter = GeminiAdapter::new("k", "").with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            adapter.complete(request()).await,
            Err(AIError::RequestFailed(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires GEMINI_API_KEY environment variable"]
    async fn test_gemini_api_integration() {
        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY not set");
        let adapter = GeminiAdapter::new(api_key, "");
        let text = adapter.complete(request()).await.unwrap();
        assert!(!text.is_empty());
    }
}
