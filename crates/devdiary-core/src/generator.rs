//! Diary generation
//!
//! Two backend passes: a first pass turns activity into a draft diary, a
//! second "enhance" pass polishes it. The first pass is mandatory; if the
//! enhance pass fails the draft is used as is.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::ports::{
    AIError, AIProviderPort, ActivityData, CompletionRequest, Diary, MarkdownRendererPort,
};
use crate::prompt::{exceeds_budget, truncate_activity, Prompt, PromptBuilder};

static TITLE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("title pattern must compile"));

/// Errors that fail a generation cycle
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The first backend pass failed; there is no content to fall back to
    #[error("Diary generation failed: {0}")]
    FirstPass(#[from] AIError),
}

/// Sampling and budget settings for both passes
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Backend input budget in tokens; `None` disables truncation
    pub input_token_budget: Option<usize>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

impl From<&AiConfig> for GenerationSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            input_token_budget: config.input_token_budget,
        }
    }
}

/// Title of the first level-1 heading, or `Dev Diary - <date>`
pub fn extract_title(markdown: &str, date: NaiveDate) -> String {
    TITLE_HEADING
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| fallback_title(date))
}

pub fn fallback_title(date: NaiveDate) -> String {
    format!("Dev Diary - {}", date.format("%Y-%m-%d"))
}

/// Generates diaries through a generative backend
pub struct DiaryGenerator {
    backend: Arc<dyn AIProviderPort>,
    renderer: Arc<dyn MarkdownRendererPort>,
    settings: GenerationSettings,
}

impl DiaryGenerator {
    pub fn new(
        backend: Arc<dyn AIProviderPort>,
        renderer: Arc<dyn MarkdownRendererPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            backend,
            renderer,
            settings,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generates today's diary from `activity`.
    pub async fn generate(&self, activity: &ActivityData) -> Result<Diary, GenerateError> {
        self.generate_for_date(activity, Local::now().date_naive())
            .await
    }

    /// Generates a diary dated `date`; the date feeds the prompt and the
    /// fallback title.
    pub async fn generate_for_date(
        &self,
        activity: &ActivityData,
        date: NaiveDate,
    ) -> Result<Diary, GenerateError> {
        let prompt = self.first_pass_prompt(activity, date)?;

        info!(provider = self.backend.name(), "Requesting diary draft");
        let draft = self.backend.complete(self.request(prompt)).await?;

        let markdown = match self
            .backend
            .complete(self.request(PromptBuilder::build_enhance_prompt(&draft)))
            .await
        {
            Ok(enhanced) if !enhanced.trim().is_empty() => enhanced,
            Ok(_) => {
                warn!(provider = self.backend.name(), "Enhance pass returned no text, keeping draft");
                draft
            }
            Err(e) => {
                warn!(provider = self.backend.name(), error = %e, "Enhance pass failed, keeping draft");
                draft
            }
        };

        let title = extract_title(&markdown, date);
        debug!(title = %title, chars = markdown.len(), "Diary generated");
        Ok(Diary::render(title, markdown, self.renderer.as_ref()))
    }

    fn first_pass_prompt(
        &self,
        activity: &ActivityData,
        date: NaiveDate,
    ) -> Result<Prompt, AIError> {
        let payload = serde_json::to_string(activity)
            .map_err(|e| AIError::InvalidRequest(format!("activity serialization: {}", e)))?;

        if !exceeds_budget(&payload, self.settings.input_token_budget) {
            return Ok(PromptBuilder::diary_prompt_from_payload(&payload, date));
        }

        warn!(
            chars = payload.len(),
            budget = ?self.settings.input_token_budget,
            "Activity data too large, truncating"
        );
        PromptBuilder::build_diary_prompt(&truncate_activity(activity), date)
    }

    fn request(&self, prompt: Prompt) -> CompletionRequest {
        CompletionRequest {
            system_prompt: prompt.system,
            user_prompt: prompt.user,
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        }
    }
}
