//! SQLite snippet store
//!
//! Persists snippets accepted by the clipboard watcher and serves them back
//! as today's snippets.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use devdiary_core::collector::start_of_local_day;
use devdiary_core::ports::{Snippet, SnippetStoreError, SnippetStorePort};
use tokio_rusqlite::Connection;
use tracing::{error, warn};

const CREATE_SNIPPETS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS snippets (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    language TEXT NOT NULL,
    project TEXT NOT NULL,
    tags TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    source TEXT NOT NULL,
    enriched INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_TIMESTAMP_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_snippets_timestamp ON snippets(timestamp)";

/// Column values of one row, converted to a [`Snippet`] outside the
/// connection thread
struct SnippetRow {
    id: String,
    code: String,
    language: String,
    project: String,
    tags: String,
    timestamp_ms: i64,
    source: String,
    enriched: bool,
}

impl SnippetRow {
    fn into_snippet(self) -> Option<Snippet> {
        let timestamp = Utc.timestamp_millis_opt(self.timestamp_ms).single()?;
        let tags: Vec<String> = serde_json::from_str(&self.tags).unwrap_or_default();
        let snippet = Snippet::new(self.code, self.language)
            .ok()?
            .with_id(self.id)
            .with_project(self.project)
            .with_tags(tags)
            .with_timestamp(timestamp)
            .with_source(self.source);
        Some(if self.enriched { snippet.enriched() } else { snippet })
    }
}

pub struct SqliteSnippetStore {
    conn: Connection,
}

impl SqliteSnippetStore {
    /// Opens (or creates) the database at `db_path` and ensures the schema.
    pub async fn new(db_path: &Path) -> Result<Self, SnippetStoreError> {
        let conn = Connection::open(db_path)
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))?;
        Self::initialize_schema(&conn).await?;

        tracing::info!(path = %db_path.display(), "Snippet database ready");
        Ok(Self { conn })
    }

    pub async fn new_in_memory() -> Result<Self, SnippetStoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))?;
        Self::initialize_schema(&conn).await?;
        Ok(Self { conn })
    }

    async fn initialize_schema(conn: &Connection) -> Result<(), SnippetStoreError> {
        conn.call(|conn| {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            conn.execute(CREATE_SNIPPETS_TABLE_SQL, [])?;
            conn.execute(CREATE_TIMESTAMP_INDEX_SQL, [])?;
            Ok(())
        })
        .await
        .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))
    }

    /// Snippets captured at or after `since`, oldest first
    pub async fn get_snippets_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Snippet>, SnippetStoreError> {
        let since_ms = since.timestamp_millis();
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, code, language, project, tags, timestamp, source, enriched
                    FROM snippets
                    WHERE timestamp >= ?1
                    ORDER BY timestamp ASC
                    "#,
                )?;
                let rows = stmt.query_map([since_ms], |row| {
                    Ok(SnippetRow {
                        id: row.get(0)?,
                        code: row.get(1)?,
                        language: row.get(2)?,
                        project: row.get(3)?,
                        tags: row.get(4)?,
                        timestamp_ms: row.get(5)?,
                        source: row.get(6)?,
                        enriched: row.get(7)?,
                    })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                let snippet = row.into_snippet();
                if snippet.is_none() {
                    warn!(snippet_id = %id, "Skipping unreadable snippet row");
                }
                snippet
            })
            .collect())
    }

    pub async fn count(&self) -> Result<usize, SnippetStoreError> {
        self.conn
            .call(|conn| {
                let count: usize =
                    conn.query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl SnippetStorePort for SqliteSnippetStore {
    async fn get_today_snippets(&self) -> Vec<Snippet> {
        match self.get_snippets_since(start_of_local_day(Local::now())).await {
            Ok(snippets) => snippets,
            Err(e) => {
                error!(error = %e, "Failed to read today's snippets");
                Vec::new()
            }
        }
    }

    /// Inserts the snippet or replaces the stored copy with the same id.
    /// The enriched flag of an existing row is never cleared.
    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), SnippetStoreError> {
        let tags = serde_json::to_string(snippet.tags())
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))?;
        let params = (
            snippet.id().to_string(),
            snippet.code().to_string(),
            snippet.language().to_string(),
            snippet.project().to_string(),
            tags,
            snippet.timestamp().timestamp_millis(),
            snippet.source().to_string(),
            snippet.is_enriched(),
        );

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO snippets (id, code, language, project, tags, timestamp, source, enriched)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(id) DO UPDATE SET
                        code = excluded.code,
                        language = excluded.language,
                        project = excluded.project,
                        tags = excluded.tags,
                        timestamp = excluded.timestamp,
                        source = excluded.source,
                        enriched = MAX(snippets.enriched, excluded.enriched)
                    "#,
                    rusqlite::params![
                        params.0, params.1, params.2, params.3, params.4, params.5, params.6,
                        params.7
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))
    }

    async fn mark_enriched(&self, id: &str) -> Result<(), SnippetStoreError> {
        let key = id.to_string();
        let affected = self
            .conn
            .call(move |conn| {
                Ok(conn.execute("UPDATE snippets SET enriched = 1 WHERE id = ?1", [key])?)
            })
            .await
            .map_err(|e| SnippetStoreError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(SnippetStoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
