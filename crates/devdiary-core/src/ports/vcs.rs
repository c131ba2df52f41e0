//! Version control port definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single commit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Errors that can occur while reading repository history
#[derive(Debug, Error)]
pub enum VcsError {
    /// Repository could not be opened
    #[error("Repository not available: {0}")]
    RepositoryUnavailable(String),

    /// History or reference query failed
    #[error("Git query failed: {0}")]
    QueryFailed(String),
}

/// Port for version control queries
#[async_trait]
pub trait VcsPort: Send + Sync {
    /// Commits authored at or after `since`, newest first.
    async fn log(&self, since: DateTime<Utc>) -> Result<Vec<Commit>, VcsError>;

    /// Names of every branch, local and remote.
    async fn list_branches(&self) -> Result<Vec<String>, VcsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_error_messages() {
        let err = VcsError::RepositoryUnavailable("/nope".to_string());
        assert!(err.to_string().contains("/nope"));

        let err = VcsError::QueryFailed("revwalk".to_string());
        assert!(err.to_string().contains("revwalk"));
    }
}
