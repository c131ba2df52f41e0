//! Publishing port definitions
//!
//! Contains the generated diary, the per-destination ports and the merged
//! result of one publish call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::render::MarkdownRendererPort;

// ============================================================================
// Domain Models
// ============================================================================

/// A generated developer diary
///
/// `html` is always the rendering of `markdown`; the only way to build a
/// diary is through a renderer so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diary {
    title: String,
    markdown: String,
    html: String,
}

impl Diary {
    pub fn render(
        title: impl Into<String>,
        markdown: impl Into<String>,
        renderer: &dyn MarkdownRendererPort,
    ) -> Self {
        let markdown = markdown.into();
        let html = renderer.render(&markdown);
        Self {
            title: title.into(),
            markdown,
            html,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Publishing destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Document database
    Notion,
    /// Gist host
    Github,
    /// Chat notifier
    Telegram,
}

impl DestinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationKind::Notion => "notion",
            DestinationKind::Github => "github",
            DestinationKind::Telegram => "telegram",
        }
    }

    /// Link label used when other destinations reference this one
    pub fn link_title(&self) -> &'static str {
        match self {
            DestinationKind::Notion => "View in Notion",
            DestinationKind::Github => "View GitHub Gist",
            DestinationKind::Telegram => "Telegram",
        }
    }
}

impl std::fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled link to a published copy of the diary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryLink {
    pub title: String,
    pub url: String,
}

/// Entry created in the document database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseEntry {
    pub url: String,
}

/// Document created on the gist host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistDocument {
    pub url: String,
    pub id: String,
}

/// A destination that was configured and attempted but failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationFailure {
    pub destination: DestinationKind,
    pub error: String,
}

/// Merged outcome of one publish call
///
/// A destination field is present only when that destination was configured,
/// attempted and succeeded. Configured destinations that failed are listed in
/// `failures`; unconfigured ones appear nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion: Option<DatabaseEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GistDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DestinationFailure>,
}

impl PublishResult {
    pub fn succeeded(&self) -> usize {
        usize::from(self.notion.is_some())
            + usize::from(self.github.is_some())
            + usize::from(self.telegram == Some(true))
    }

    pub fn attempted(&self) -> usize {
        self.succeeded() + self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human readable outcome, e.g. "published to 2 of 3 destinations"
    pub fn summary(&self) -> String {
        match self.attempted() {
            0 => "no destinations configured".to_string(),
            1 => format!("published to {} of 1 destination", self.succeeded()),
            n => format!("published to {} of {} destinations", self.succeeded(), n),
        }
    }

    /// Links to every successful destination that produced a URL
    pub fn links(&self) -> Vec<DiaryLink> {
        let mut links = Vec::new();
        if let Some(entry) = &self.notion {
            links.push(DiaryLink {
                title: DestinationKind::Notion.link_title().to_string(),
                url: entry.url.clone(),
            });
        }
        if let Some(gist) = &self.github {
            links.push(DiaryLink {
                title: DestinationKind::Github.link_title().to_string(),
                url: gist.url.clone(),
            });
        }
        links
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by publishing
#[derive(Debug, Error)]
pub enum PublishError {
    /// The diary cannot be published at all
    #[error("Malformed diary: {0}")]
    MalformedDiary(String),

    #[error("Unauthorized: {0} rejected the configured credentials")]
    Unauthorized(DestinationKind),

    #[error("Rate limit exceeded at {0}")]
    RateLimited(DestinationKind),

    #[error("{0} request failed: {1}")]
    RequestFailed(DestinationKind, String),

    #[error("{0} returned an invalid response: {1}")]
    InvalidResponse(DestinationKind, String),

    /// The destination answered but reported it did not deliver
    #[error("{0} reported the message was not delivered")]
    NotDelivered(DestinationKind),
}

// ============================================================================
// Port Traits
// ============================================================================

/// Document-database destination
#[async_trait]
pub trait DocumentDatabasePort: Send + Sync {
    /// Creates an entry and returns its URL
    async fn create_entry(
        &self,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<String, PublishError>;
}

/// Gist-host destination
#[async_trait]
pub trait GistHostPort: Send + Sync {
    async fn create_document(
        &self,
        title: &str,
        body: &str,
        is_public: bool,
    ) -> Result<GistDocument, PublishError>;
}

/// Chat-notifier destination
#[async_trait]
pub trait ChatNotifierPort: Send + Sync {
    /// Sends a short summary; `Ok(false)` means the service did not deliver.
    async fn send_summary(
        &self,
        title: &str,
        summary: &str,
        links: &[DiaryLink],
    ) -> Result<bool, PublishError>;
}
