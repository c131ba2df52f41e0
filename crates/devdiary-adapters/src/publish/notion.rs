//! Notion document database adapter

use async_trait::async_trait;
use chrono::Utc;
use devdiary_core::ports::{DestinationKind, DocumentDatabasePort, PublishError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{error_for_status, transport_error};
use crate::ai::http_client;

pub const NOTION_VERSION: &str = "2022-06-28";

const NOTION_API_BASE: &str = "https://api.notion.com";
const HEADER_TEXT: &str = "Developer Diary Entry";
/// Notion rejects rich text longer than this per block
const MAX_BLOCK_CHARS: usize = 2000;
const KIND: DestinationKind = DestinationKind::Notion;

pub struct NotionAdapter {
    client: Client,
    api_key: String,
    database_id: String,
    base_url: String,
}

impl NotionAdapter {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            database_id: database_id.into(),
            base_url: NOTION_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn page_body(&self, title: &str, body: &str, tags: &[String]) -> Value {
        let mut children = vec![json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": {"content": HEADER_TEXT},
                    "annotations": {"bold": true}
                }]
            }
        })];
        children.extend(chunk_chars(body, MAX_BLOCK_CHARS).into_iter().map(|chunk| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{"type": "text", "text": {"content": chunk}}]
                }
            })
        }));

        json!({
            "parent": {"database_id": self.database_id},
            "properties": {
                "title": {"title": [{"text": {"content": title}}]},
                "Tags": {"multi_select": tags.iter().map(|t| json!({"name": t})).collect::<Vec<_>>()},
                "Date": {"date": {"start": Utc::now().to_rfc3339()}}
            },
            "children": children
        })
    }
}

/// Splits `text` into pieces of at most `max` characters
fn chunk_chars(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    url: Option<String>,
}

#[async_trait]
impl DocumentDatabasePort for NotionAdapter {
    async fn create_entry(
        &self,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<String, PublishError> {
        debug!(title, tags = tags.len(), "Creating Notion page");

        let response = self
            .client
            .post(format!("{}/v1/pages", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&self.page_body(title, body, tags))
            .send()
            .await
            .map_err(|e| transport_error(KIND, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(KIND, status, error_body));
        }

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(KIND, e.to_string()))?;
        let url = page
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| PublishError::InvalidResponse(KIND, "page has no url".to_string()))?;

        info!(url = %url, "Created Notion page");
        Ok(url)
    }
}
