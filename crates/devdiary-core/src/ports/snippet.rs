//! Snippet port definitions
//!
//! A snippet is a captured unit of source code plus its classification
//! metadata. Snippets come either from the clipboard watcher (external
//! capture) or from a snippet store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Domain Models
// ============================================================================

/// Language label used when detection does not reach the acceptance threshold
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A captured code snippet
///
/// Fields are read-only once constructed; `enriched` is the single mutable
/// flag and only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnippetRecord", into = "SnippetRecord")]
pub struct Snippet {
    id: String,
    code: String,
    language: String,
    project: String,
    tags: Vec<String>,
    timestamp: DateTime<Utc>,
    source: String,
    enriched: bool,
}

/// Wire shape of a snippet, validated into [`Snippet`] on deserialization
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnippetRecord {
    #[serde(default)]
    id: String,
    code: String,
    #[serde(default = "unknown_language")]
    language: String,
    #[serde(default)]
    project: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    enriched: bool,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

/// Rejected snippet construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSnippet {
    #[error("snippet code must not be empty")]
    EmptyCode,
}

impl Snippet {
    /// Creates a snippet with a fresh id and the current timestamp.
    ///
    /// # Errors
    /// Returns `InvalidSnippet::EmptyCode` if `code` is empty or whitespace only.
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, InvalidSnippet> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(InvalidSnippet::EmptyCode);
        }
        let language = language.into();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            code,
            language: if language.trim().is_empty() {
                unknown_language()
            } else {
                language
            },
            project: String::new(),
            tags: Vec::new(),
            timestamp: Utc::now(),
            source: String::new(),
            enriched: false,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Replaces the tags; they are lowercased and deduplicated keeping the
    /// first occurrence.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Builder form of [`Snippet::mark_enriched`] for records loaded from a store.
    pub fn enriched(mut self) -> Self {
        self.enriched = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_enriched(&self) -> bool {
        self.enriched
    }

    /// Flags the snippet as enriched. There is no way back.
    pub fn mark_enriched(&mut self) {
        self.enriched = true;
    }
}

fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl TryFrom<SnippetRecord> for Snippet {
    type Error = InvalidSnippet;

    fn try_from(record: SnippetRecord) -> Result<Self, Self::Error> {
        let mut snippet = Snippet::new(record.code, record.language)?
            .with_project(record.project)
            .with_tags(record.tags)
            .with_timestamp(record.timestamp)
            .with_source(record.source);
        if !record.id.is_empty() {
            snippet = snippet.with_id(record.id);
        }
        if record.enriched {
            snippet.mark_enriched();
        }
        Ok(snippet)
    }
}

impl From<Snippet> for SnippetRecord {
    fn from(s: Snippet) -> Self {
        Self {
            id: s.id,
            code: s.code,
            language: s.language,
            project: s.project,
            tags: s.tags,
            timestamp: s.timestamp,
            source: s.source,
            enriched: s.enriched,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by snippet store write operations
#[derive(Debug, Error)]
pub enum SnippetStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Snippet not found: id={0}")]
    NotFound(String),
}

// ============================================================================
// Port Traits
// ============================================================================

/// Port for snippet sources
#[async_trait]
pub trait SnippetStorePort: Send + Sync {
    /// Snippets captured or updated since local midnight.
    ///
    /// Must not fail: implementations log internal errors and return an
    /// empty list instead.
    async fn get_today_snippets(&self) -> Vec<Snippet>;

    /// Persists a snippet captured outside the store.
    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), SnippetStoreError>;

    /// Flags a stored snippet as enriched.
    ///
    /// Stores that do not track the flag accept the call and do nothing.
    async fn mark_enriched(&self, _id: &str) -> Result<(), SnippetStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_code() {
        assert_eq!(Snippet::new("", "Rust"), Err(InvalidSnippet::EmptyCode));
        assert_eq!(Snippet::new("  \n\t", "Rust"), Err(InvalidSnippet::EmptyCode));
    }

    #[test]
    fn test_new_defaults() {
        let snippet = Snippet::new("fn main() {}", "").unwrap();
        assert_eq!(snippet.language(), UNKNOWN_LANGUAGE);
        assert!(!snippet.is_enriched());
        assert!(!snippet.id().is_empty());
        assert!(snippet.tags().is_empty());
    }

    #[test]
    fn test_tags_are_lowercased_and_deduplicated() {
        let snippet = Snippet::new("x = 1", "Python")
            .unwrap()
            .with_tags(["Python", "external", "python", " EXTERNAL ", ""]);
        assert_eq!(snippet.tags(), &["python".to_string(), "external".to_string()]);
    }

    #[test]
    fn test_mark_enriched_is_one_way() {
        let mut snippet = Snippet::new("x = 1", "Python").unwrap();
        snippet.mark_enriched();
        assert!(snippet.is_enriched());
        snippet.mark_enriched();
        assert!(snippet.is_enriched());
    }

    #[test]
    fn test_deserialize_validates_code() {
        let err = serde_json::from_str::<Snippet>(r#"{"code": ""}"#);
        assert!(err.is_err());

        let snippet: Snippet = serde_json::from_str(
            r#"{"id": "abc", "code": "SELECT 1;", "language": "SQL", "tags": ["DB", "db"], "enriched": true}"#,
        )
        .unwrap();
        assert_eq!(snippet.id(), "abc");
        assert_eq!(snippet.tags(), &["db".to_string()]);
        assert!(snippet.is_enriched());
    }

    #[test]
    fn test_deserialize_missing_id_generates_one() {
        let snippet: Snippet = serde_json::from_str(r#"{"code": "let x = 1;"}"#).unwrap();
        assert!(!snippet.id().is_empty());
        assert_eq!(snippet.language(), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_serialize_roundtrip_keeps_fields() {
        let snippet = Snippet::new("package main", "Go")
            .unwrap()
            .with_id("go-1")
            .with_project("svc")
            .with_source("Pieces");
        let json = serde_json::to_value(&snippet).unwrap();
        assert_eq!(json["id"], "go-1");
        assert_eq!(json["project"], "svc");
        assert_eq!(json["enriched"], false);
    }
}
