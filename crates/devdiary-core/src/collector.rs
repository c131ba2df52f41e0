//! Activity collection
//!
//! Gathers today's snippets and version control activity into one
//! [`ActivityData`]. Collection never fails: a failing source is logged and
//! its section stays empty while the other sources still populate.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::ports::{ActivityData, Snippet, SnippetStorePort, VcsPort};

/// Collects activity from the configured sources
pub struct ActivityCollector {
    snippets: Option<Arc<dyn SnippetStorePort>>,
    vcs: Option<Arc<dyn VcsPort>>,
}

impl ActivityCollector {
    pub fn new(
        snippets: Option<Arc<dyn SnippetStorePort>>,
        vcs: Option<Arc<dyn VcsPort>>,
    ) -> Self {
        Self { snippets, vcs }
    }

    /// A collector with no sources; always yields empty activity.
    pub fn empty() -> Self {
        Self::new(None, None)
    }

    pub fn has_snippet_source(&self) -> bool {
        self.snippets.is_some()
    }

    pub fn has_vcs(&self) -> bool {
        self.vcs.is_some()
    }

    /// Builds a fresh `ActivityData` for today.
    pub async fn collect(&self) -> ActivityData {
        let mut activity = ActivityData::default();

        if let Some(store) = &self.snippets {
            activity.snippets = store.get_today_snippets().await;
            debug!(count = activity.snippets.len(), "Collected snippets");
        }

        if let Some(vcs) = &self.vcs {
            let since = start_of_local_day(Local::now());

            match vcs.log(since).await {
                Ok(commits) => {
                    debug!(count = commits.len(), "Collected commits");
                    activity.git_activity.commits = commits;
                }
                Err(e) => warn!(error = %e, "Failed to read commit log"),
            }

            match vcs.list_branches().await {
                Ok(branches) => activity.git_activity.branches = branches.into_iter().collect(),
                Err(e) => warn!(error = %e, "Failed to list branches"),
            }
        }

        activity
    }

    /// Flags `snippets` as enriched in the snippet store. Best effort: failures
    /// are logged.
    pub async fn mark_enriched(&self, snippets: &[Snippet]) {
        let Some(store) = &self.snippets else {
            return;
        };
        for snippet in snippets.iter().filter(|s| !s.is_enriched()) {
            if let Err(e) = store.mark_enriched(snippet.id()).await {
                debug!(snippet_id = snippet.id(), error = %e, "Could not mark snippet enriched");
            }
        }
    }
}

/// Local midnight of the day containing `now`, as UTC
pub fn start_of_local_day<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // A DST gap at midnight has no local 00:00; fall back to the UTC reading.
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
