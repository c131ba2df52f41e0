//! GitHub Gist adapter

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use devdiary_core::ports::{DestinationKind, GistDocument, GistHostPort, PublishError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{error_for_status, transport_error};
use crate::ai::http_client;

pub const DEFAULT_GIST_FILENAME: &str = "dev-diary.md";

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "devdiary";
const KIND: DestinationKind = DestinationKind::Github;

pub struct GistAdapter {
    client: Client,
    token: String,
    filename: String,
    base_url: String,
}

impl GistAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            token: token.into(),
            filename: DEFAULT_GIST_FILENAME.to_string(),
            base_url: GITHUB_API_BASE.to_string(),
        }
    }

    /// Base file name; each gist file is prefixed with the publish date.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn dated_filename(&self, date: NaiveDate) -> String {
        format!("{}-{}", date.format("%Y-%m-%d"), self.filename)
    }
}

#[derive(Debug, Serialize)]
struct CreateGistRequest<'a> {
    description: &'a str,
    public: bool,
    files: HashMap<String, GistFile<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    id: String,
    html_url: String,
}

#[async_trait]
impl GistHostPort for GistAdapter {
    async fn create_document(
        &self,
        title: &str,
        body: &str,
        is_public: bool,
    ) -> Result<GistDocument, PublishError> {
        let filename = self.dated_filename(Utc::now().date_naive());
        let request = CreateGistRequest {
            description: title,
            public: is_public,
            files: HashMap::from([(filename, GistFile { content: body })]),
        };

        let response = self
            .client
            .post(format!("{}/gists", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(KIND, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(KIND, status, error_body));
        }

        let gist: GistResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(KIND, e.to_string()))?;

        info!(url = %gist.html_url, public = is_public, "Created gist");
        Ok(GistDocument {
            url: gist.html_url,
            id: gist.id,
        })
    }
}
