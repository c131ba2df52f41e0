//! Git repository adapter
//!
//! Reads commit history and branch names through libgit2. Every call opens
//! the repository on a blocking thread, so a repository that appears or
//! moves between cycles is picked up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use devdiary_core::ports::{Commit, VcsError, VcsPort};
use git2::{BranchType, ErrorCode, Repository, Sort};
use tracing::debug;

pub struct GitRepositoryAdapter {
    path: PathBuf,
}

impl GitRepositoryAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_repo<T, F>(&self, f: F) -> Result<T, VcsError>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T, VcsError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let repo = Repository::open(&path).map_err(|e| {
                VcsError::RepositoryUnavailable(format!("{}: {}", path.display(), e.message()))
            })?;
            f(&repo)
        })
        .await
        .map_err(|e| VcsError::QueryFailed(e.to_string()))?
    }
}

fn query_error(e: git2::Error) -> VcsError {
    VcsError::QueryFailed(e.message().to_string())
}

/// Commits reachable from HEAD made at or after `since`, newest first
fn commits_since(repo: &Repository, since: DateTime<Utc>) -> Result<Vec<Commit>, VcsError> {
    match repo.head() {
        Ok(_) => {}
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(query_error(e)),
    }

    let mut walk = repo.revwalk().map_err(query_error)?;
    walk.set_sorting(Sort::TIME).map_err(query_error)?;
    walk.push_head().map_err(query_error)?;

    let since_secs = since.timestamp();
    let mut commits = Vec::new();
    for oid in walk {
        let commit = repo
            .find_commit(oid.map_err(query_error)?)
            .map_err(query_error)?;
        let seconds = commit.time().seconds();
        if seconds < since_secs {
            break;
        }
        commits.push(Commit {
            message: commit.summary().unwrap_or_default().to_string(),
            timestamp: Utc
                .timestamp_opt(seconds, 0)
                .single()
                .unwrap_or_else(Utc::now),
        });
    }
    Ok(commits)
}

/// Local and remote-tracking branch names; `origin/HEAD` is skipped
fn branch_names(repo: &Repository) -> Result<Vec<String>, VcsError> {
    let mut names = Vec::new();
    for branch in repo.branches(None).map_err(query_error)? {
        let (branch, kind) = branch.map_err(query_error)?;
        let Some(name) = branch.name().map_err(query_error)? else {
            continue;
        };
        if kind == BranchType::Remote && name.ends_with("/HEAD") {
            continue;
        }
        names.push(name.to_string());
    }
    names.sort();
    Ok(names)
}

#[async_trait]
impl VcsPort for GitRepositoryAdapter {
    async fn log(&self, since: DateTime<Utc>) -> Result<Vec<Commit>, VcsError> {
        let commits = self.with_repo(move |repo| commits_since(repo, since)).await?;
        debug!(count = commits.len(), path = %self.path.display(), "Read commit log");
        Ok(commits)
    }

    async fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        self.with_repo(branch_names).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn commit_at(repo: &Repository, file: &str, message: &str, seconds: i64) {
        let workdir = repo.workdir().unwrap().to_path_buf();
        fs::write(workdir.join(file), message).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::new("Dev", "dev@example.com", &Time::new(seconds, 0)).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[tokio::test]
    async fn test_log_since() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let now = Utc::now().timestamp();
        commit_at(&repo, "a.txt", "Initial commit", now - 3 * 86_400);
        commit_at(&repo, "b.txt", "Add parser\n\nLong body", now - 60);
        commit_at(&repo, "c.txt", "Fix tests", now - 30);

        let adapter = GitRepositoryAdapter::new(temp.path());
        let since = Utc.timestamp_opt(now - 86_400, 0).unwrap();
        let commits = adapter.log(since).await.unwrap();

        let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["Fix tests", "Add parser"]);
        assert_eq!(commits[0].timestamp.timestamp(), now - 30);
    }

    #[tokio::test]
    async fn test_list_branches() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_at(&repo, "a.txt", "Initial commit", Utc::now().timestamp());
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("feature/diary", &head, false).unwrap();

        let adapter = GitRepositoryAdapter::new(temp.path());
        let branches = adapter.list_branches().await.unwrap();
        assert!(branches.contains(&"feature/diary".to_string()));
        assert_eq!(branches.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_repository_has_no_commits() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();

        let adapter = GitRepositoryAdapter::new(temp.path());
        assert!(adapter.log(Utc::now()).await.unwrap().is_empty());
        assert!(adapter.list_branches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_repository() {
        let temp = TempDir::new().unwrap();
        let adapter = GitRepositoryAdapter::new(temp.path().join("nope"));
        assert!(matches!(
            adapter.log(Utc::now()).await,
            Err(VcsError::RepositoryUnavailable(_))
        ));
    }
}
