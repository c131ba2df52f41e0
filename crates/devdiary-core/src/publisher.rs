//! Multi-destination publishing
//!
//! Each configured destination is attempted independently; a failing
//! destination is recorded in the result and never blocks the others.
//! Primary destinations (document database, gist host) run concurrently. The
//! chat notifier is a follow-up: it runs once they have all settled so its
//! message can link to whichever of them succeeded.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::ports::{
    ChatNotifierPort, DatabaseEntry, DestinationFailure, DestinationKind, Diary, DiaryLink,
    DocumentDatabasePort, GistDocument, GistHostPort, PublishError, PublishResult,
};

/// Characters of the second paragraph kept in the chat summary
pub const SUMMARY_CHARS: usize = 200;
/// Summary used when the diary has no second paragraph
pub const FALLBACK_SUMMARY: &str = "Developer diary created";

static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)#([A-Za-z0-9_-]+)").expect("hashtag pattern must compile"));

/// Hashtags in `markdown` (`#word` not preceded by a non-space character),
/// without the `#`, deduplicated in order of appearance.
pub fn extract_tags(markdown: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in HASHTAG.captures_iter(markdown) {
        let tag = caps[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Second paragraph cut to 200 characters plus `...`, or the fallback phrase.
pub fn compose_summary(markdown: &str) -> String {
    match markdown.split("\n\n").nth(1).map(str::trim) {
        Some(paragraph) if !paragraph.is_empty() => {
            let head: String = paragraph.chars().take(SUMMARY_CHARS).collect();
            format!("{}...", head)
        }
        _ => FALLBACK_SUMMARY.to_string(),
    }
}

// ============================================================================
// Destinations
// ============================================================================

/// When a destination runs within one publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Runs first, concurrently with the other primaries
    Primary,
    /// Runs after every primary settled, with links to the successful ones
    FollowUp,
}

/// What a successful destination produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationOutcome {
    Entry(DatabaseEntry),
    Gist(GistDocument),
    Notified,
}

/// A configured publishing destination
#[async_trait]
pub trait Destination: Send + Sync {
    fn kind(&self) -> DestinationKind;

    fn stage(&self) -> Stage {
        Stage::Primary
    }

    /// Publishes `diary`. `links` points at copies published earlier in the
    /// same call and is empty for primary destinations.
    async fn attempt(
        &self,
        diary: &Diary,
        links: &[DiaryLink],
    ) -> Result<DestinationOutcome, PublishError>;
}

/// Document database: title, markdown body and hashtags as tags
pub struct DocumentDatabaseDestination {
    port: Arc<dyn DocumentDatabasePort>,
}

impl DocumentDatabaseDestination {
    pub fn new(port: Arc<dyn DocumentDatabasePort>) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Destination for DocumentDatabaseDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Notion
    }

    async fn attempt(
        &self,
        diary: &Diary,
        _links: &[DiaryLink],
    ) -> Result<DestinationOutcome, PublishError> {
        let tags = extract_tags(diary.markdown());
        let url = self
            .port
            .create_entry(diary.title(), diary.markdown(), &tags)
            .await?;
        Ok(DestinationOutcome::Entry(DatabaseEntry { url }))
    }
}

/// Gist host: the markdown body as a private (by default) document
pub struct GistHostDestination {
    port: Arc<dyn GistHostPort>,
    public: bool,
}

impl GistHostDestination {
    pub fn new(port: Arc<dyn GistHostPort>) -> Self {
        Self {
            port,
            public: false,
        }
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

#[async_trait]
impl Destination for GistHostDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Github
    }

    async fn attempt(
        &self,
        diary: &Diary,
        _links: &[DiaryLink],
    ) -> Result<DestinationOutcome, PublishError> {
        let gist = self
            .port
            .create_document(diary.title(), diary.markdown(), self.public)
            .await?;
        Ok(DestinationOutcome::Gist(gist))
    }
}

/// Chat notifier: short summary plus links to the other destinations
pub struct ChatNotifierDestination {
    port: Arc<dyn ChatNotifierPort>,
}

impl ChatNotifierDestination {
    pub fn new(port: Arc<dyn ChatNotifierPort>) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Destination for ChatNotifierDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Telegram
    }

    fn stage(&self) -> Stage {
        Stage::FollowUp
    }

    async fn attempt(
        &self,
        diary: &Diary,
        links: &[DiaryLink],
    ) -> Result<DestinationOutcome, PublishError> {
        let summary = compose_summary(diary.markdown());
        if self.port.send_summary(diary.title(), &summary, links).await? {
            Ok(DestinationOutcome::Notified)
        } else {
            Err(PublishError::NotDelivered(self.kind()))
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Fans a diary out to every configured destination
#[derive(Default)]
pub struct PublishCoordinator {
    destinations: Vec<Box<dyn Destination>>,
}

impl PublishCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, destination: Box<dyn Destination>) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn destination_kinds(&self) -> Vec<DestinationKind> {
        self.destinations.iter().map(|d| d.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Publishes to every destination and merges the outcomes.
    ///
    /// # Errors
    /// Only `PublishError::MalformedDiary`, for a diary with a blank title.
    /// Destination failures are reported in `PublishResult::failures`.
    pub async fn publish(&self, diary: &Diary) -> Result<PublishResult, PublishError> {
        if diary.title().trim().is_empty() {
            return Err(PublishError::MalformedDiary("title is empty".to_string()));
        }

        let mut result = PublishResult::default();

        let primaries = self
            .destinations
            .iter()
            .filter(|d| d.stage() == Stage::Primary);
        let outcomes = join_all(primaries.map(|d| async move {
            (d.kind(), d.attempt(diary, &[]).await)
        }))
        .await;
        for (kind, outcome) in outcomes {
            record(&mut result, kind, outcome);
        }

        let links = result.links();
        for destination in self
            .destinations
            .iter()
            .filter(|d| d.stage() == Stage::FollowUp)
        {
            let outcome = destination.attempt(diary, &links).await;
            record(&mut result, destination.kind(), outcome);
        }

        info!(
            title = diary.title(),
            succeeded = result.succeeded(),
            attempted = result.attempted(),
            "Diary {}",
            result.summary()
        );
        Ok(result)
    }
}

fn record(
    result: &mut PublishResult,
    kind: DestinationKind,
    outcome: Result<DestinationOutcome, PublishError>,
) {
    match outcome {
        Ok(DestinationOutcome::Entry(entry)) => result.notion = Some(entry),
        Ok(DestinationOutcome::Gist(gist)) => result.github = Some(gist),
        Ok(DestinationOutcome::Notified) => result.telegram = Some(true),
        Err(e) => {
            warn!(destination = %kind, error = %e, "Publishing failed");
            result.failures.push(DestinationFailure {
                destination: kind,
                error: e.to_string(),
            });
        }
    }
}
