//! Pieces-style snippet service client
//!
//! Talks to a local snippet service exposing `/assets/snapshot` and
//! `/assets/create`.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use devdiary_core::collector::start_of_local_day;
use devdiary_core::ports::{Snippet, SnippetStoreError, SnippetStorePort};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::ai::http_client;

pub const DEFAULT_PIECES_BASE_URL: &str = "http://localhost:1000";

const DEFAULT_LANGUAGE: &str = "text";
const DEFAULT_PROJECT: &str = "Unknown";
const PROJECT_KEY: &str = "project";
const SOURCE: &str = "Pieces";

pub struct PiecesSnippetStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PiecesSnippetStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Every asset the service knows about
    pub async fn snapshot(&self) -> Result<Vec<Asset>, SnippetStoreError> {
        let response = self
            .authorize(self.client.get(format!("{}/assets/snapshot", self.base_url)))
            .send()
            .await
            .map_err(|e| SnippetStoreError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnippetStoreError::RequestFailed(format!(
                "snapshot returned {}",
                status
            )));
        }

        let assets: Assets = response
            .json()
            .await
            .map_err(|e| SnippetStoreError::InvalidResponse(e.to_string()))?;
        Ok(assets.iterable)
    }

    /// Snippets for assets created or updated at or after `since`
    pub async fn snippets_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Snippet>, SnippetStoreError> {
        let since_ms = since.timestamp_millis();
        let snippets: Vec<Snippet> = self
            .snapshot()
            .await?
            .into_iter()
            .filter(|asset| asset.touched_since(since_ms))
            .filter_map(Asset::into_snippet)
            .collect();
        debug!(count = snippets.len(), "Loaded snippets from Pieces");
        Ok(snippets)
    }
}

#[async_trait]
impl SnippetStorePort for PiecesSnippetStore {
    async fn get_today_snippets(&self) -> Vec<Snippet> {
        match self.snippets_since(start_of_local_day(Local::now())).await {
            Ok(snippets) => snippets,
            Err(e) => {
                error!(error = %e, "Failed to retrieve today's snippets from Pieces");
                Vec::new()
            }
        }
    }

    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), SnippetStoreError> {
        let body = CreateAssetRequest {
            asset: NewAsset {
                name: format!("{} snippet", snippet.language()),
                format: Format {
                    syntax_highlight: Some(snippet.language().to_lowercase()),
                },
                original: snippet.code().to_string(),
                tags: snippet
                    .tags()
                    .iter()
                    .map(|tag| Tag {
                        text: Some(tag.clone()),
                    })
                    .collect(),
                metadata: Metadata {
                    custom: if snippet.project().is_empty() {
                        Vec::new()
                    } else {
                        vec![CustomField {
                            key: PROJECT_KEY.to_string(),
                            value: snippet.project().to_string(),
                        }]
                    },
                },
            },
        };

        let response = self
            .authorize(self.client.post(format!("{}/assets/create", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| SnippetStoreError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnippetStoreError::RequestFailed(format!(
                "create returned {}",
                status
            )));
        }
        Ok(())
    }
}

// === Wire types ===

#[derive(Debug, Deserialize)]
struct Assets {
    #[serde(default)]
    iterable: Vec<Asset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    format: Option<Format>,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    created: Option<Millis>,
    #[serde(default)]
    updated: Option<Millis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Format {
    #[serde(default)]
    syntax_highlight: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tag {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Metadata {
    #[serde(default)]
    custom: Vec<CustomField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomField {
    key: String,
    value: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Millis {
    milliseconds: i64,
}

impl Asset {
    fn created_ms(&self) -> i64 {
        self.created.map(|m| m.milliseconds).unwrap_or(0)
    }

    fn touched_since(&self, since_ms: i64) -> bool {
        let updated = self.updated.map(|m| m.milliseconds).unwrap_or(0);
        self.created_ms() >= since_ms || updated >= since_ms
    }

    /// Assets without code are dropped.
    fn into_snippet(self) -> Option<Snippet> {
        let language = self
            .format
            .as_ref()
            .and_then(|f| f.syntax_highlight.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let project = self
            .metadata
            .as_ref()
            .and_then(|m| m.custom.iter().find(|c| c.key == PROJECT_KEY))
            .map(|c| c.value.clone())
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        let timestamp = Utc
            .timestamp_millis_opt(self.created_ms())
            .single()
            .filter(|_| self.created.is_some())
            .unwrap_or_else(Utc::now);
        let tags: Vec<String> = self.tags.iter().filter_map(|t| t.text.clone()).collect();

        let mut snippet = Snippet::new(self.original?, language)
            .ok()?
            .with_project(project)
            .with_tags(tags)
            .with_timestamp(timestamp)
            .with_source(SOURCE);
        if let Some(id) = self.id.filter(|id| !id.is_empty()) {
            snippet = snippet.with_id(id);
        }
        Some(snippet)
    }
}

#[derive(Debug, Serialize)]
struct CreateAssetRequest {
    asset: NewAsset,
}

#[derive(Debug, Serialize)]
struct NewAsset {
    name: String,
    format: Format,
    original: String,
    tags: Vec<Tag>,
    metadata: Metadata,
}
