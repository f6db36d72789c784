//! SQLite persistence for validated articles.
//!
//! Articles go into a single `tech_articles` table. The `link` column is
//! unique, and inserts use `INSERT OR IGNORE`, so re-running the pipeline
//! against the same listing never duplicates a row even though each run
//! stamps a fresh date. Existing rows are never updated or deleted.
//!
//! Write and read failures are logged here and degrade to an empty result;
//! they do not reach the pipeline as errors.

use crate::models::{Article, StoredArticle};
use rusqlite::{Connection, params};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Name of the article table.
pub const TABLE_NAME: &str = "tech_articles";

/// Errors raised while opening or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The SQLite layer rejected an operation.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Owns the connection to the article table.
#[derive(Debug)]
pub struct ArticleStore {
    conn: Connection,
}

impl ArticleStore {
    /// Open (or create) the database file at `path` and ensure the schema.
    ///
    /// The parent directory is created when missing. Opening an existing
    /// database leaves its rows untouched.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let started_at = Instant::now();
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        info!(
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Opened article database"
        );
        Ok(Self { conn })
    }

    /// In-memory database with the schema applied.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert every article whose link is not stored yet.
    ///
    /// # Returns
    ///
    /// The number of new rows. Articles with an already stored link are
    /// skipped silently and not counted. On a database error the whole batch
    /// is rolled back, the error is logged and `0` is returned.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub fn store(&self, articles: &[Article]) -> usize {
        match self.try_store(articles) {
            Ok(inserted) => {
                info!(
                    inserted,
                    skipped = articles.len() - inserted,
                    total = self.count(),
                    table = TABLE_NAME,
                    "Stored articles"
                );
                inserted
            }
            Err(e) => {
                error!(error = %e, table = TABLE_NAME, "Failed storing articles");
                0
            }
        }
    }

    fn try_store(&self, articles: &[Article]) -> StoreResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {TABLE_NAME} (title, summary, link, date, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ))?;
            for article in articles {
                let changed = stmt.execute(params![
                    article.title(),
                    article.summary(),
                    article.link(),
                    article.date(),
                    article.source(),
                ])?;
                if changed == 0 {
                    debug!(link = %article.link(), "Link already stored; skipped");
                }
                inserted += changed;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Every stored row, ordered by id.
    ///
    /// On a database error the error is logged and an empty list returned.
    pub fn read_all(&self) -> Vec<StoredArticle> {
        match self.try_read_all() {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, table = TABLE_NAME, "Failed reading articles");
                Vec::new()
            }
        }
    }

    fn try_read_all(&self) -> StoreResult<Vec<StoredArticle>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title, summary, link, date, source, timestamp
             FROM {TABLE_NAME}
             ORDER BY id"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredArticle {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    summary: row.get(2)?,
                    link: row.get(3)?,
                    date: row.get(4)?,
                    source: row.get(5)?,
                    timestamp: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of stored rows; `0` if the table cannot be read.
    pub fn count(&self) -> usize {
        let sql = format!("SELECT COUNT(*) FROM {TABLE_NAME}");
        match self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0)) {
            Ok(n) => usize::try_from(n).unwrap_or(0),
            Err(e) => {
                error!(error = %e, table = TABLE_NAME, "Failed counting articles");
                0
            }
        }
    }
}

/// Create the article table and its unique link index if they are missing.
pub fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            title     TEXT NOT NULL,
            summary   TEXT,
            link      TEXT UNIQUE,
            date      TEXT NOT NULL,
            source    TEXT,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_link ON {TABLE_NAME}(link);
        "
    ))?;
    Ok(())
}
