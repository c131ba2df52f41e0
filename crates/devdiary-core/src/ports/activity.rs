//! Activity aggregate
//!
//! `ActivityData` is the normalized input of one diary generation cycle. It is
//! built fresh by the collector each cycle (or supplied by the caller) and is
//! never persisted by the core.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::snippet::Snippet;
use super::vcs::Commit;

// ============================================================================
// Domain Models
// ============================================================================

/// Everything gathered for one generation cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityData {
    pub snippets: Vec<Snippet>,
    pub notes: Vec<String>,
    pub decisions: Vec<String>,
    pub tasks: Vec<Task>,
    pub git_activity: GitActivity,
}

/// A task with completion state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Version control activity for the day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitActivity {
    pub commits: Vec<Commit>,
    pub branches: BTreeSet<String>,
    pub pull_requests: Vec<PullRequest>,
}

/// A pull request reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    pub status: String,
}

impl ActivityData {
    /// True when no section carries any data
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
            && self.notes.is_empty()
            && self.decisions.is_empty()
            && self.tasks.is_empty()
            && self.git_activity.is_empty()
    }
}

impl GitActivity {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.branches.is_empty() && self.pull_requests.is_empty()
    }
}
