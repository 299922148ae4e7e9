//! Fingerprint & history store: SQLite-backed posting history and news
//! cache.
//!
//! All mutation is insert-if-absent; rows are never updated or deleted by
//! normal operation. The store tolerates overlapping processes (WAL + busy
//! timeout), while logical races stay the gate's concern.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::debug;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS posts (
  id INTEGER PRIMARY KEY,
  fingerprint TEXT UNIQUE NOT NULL,
  text TEXT NOT NULL,
  source TEXT NOT NULL,
  url TEXT NOT NULL DEFAULT '',
  media_ref TEXT,
  posted_at TEXT NOT NULL,
  external_id TEXT
);

CREATE TABLE IF NOT EXISTS cache_items (
  id INTEGER PRIMARY KEY,
  fingerprint TEXT UNIQUE NOT NULL,
  title TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  url TEXT NOT NULL DEFAULT '',
  source TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_fingerprint ON posts(fingerprint);
CREATE INDEX IF NOT EXISTS idx_posts_posted_at ON posts(posted_at);
CREATE INDEX IF NOT EXISTS idx_cache_fingerprint ON cache_items(fingerprint);
";

/// Deterministic content fingerprint: SHA-256 over the parts joined with a
/// separator that never occurs in them. Same parts, same order → same hash.
pub fn fingerprint<S: AsRef<str>>(parts: &[S]) -> String {
    use sha2::{Digest, Sha256};
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("||");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Fixed-width UTC timestamp so lexicographic comparison in SQL matches
/// chronological order.
fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A successful (or simulated) publish, ready to persist.
#[derive(Debug, Clone)]
pub struct NewPostRecord {
    pub fingerprint: String,
    pub text: String,
    pub source: String,
    pub url: String,
    pub media_ref: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub external_id: Option<String>,
}

/// A fetched-but-not-yet-posted news item from the staging cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    pub fingerprint: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at `path`, applying the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("connecting to SQLite store")?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests. Single connection: each SQLite `:memory:`
    /// connection is its own database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("opening in-memory store")?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        for stmt in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .context("applying store schema")?;
        }
        debug!("store schema ready");
        Ok(())
    }

    pub async fn has_been_posted(&self, fp: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE fingerprint = ?")
            .bind(fp)
            .fetch_optional(&self.pool)
            .await
            .context("querying post fingerprint")?;
        Ok(row.is_some())
    }

    /// Insert-if-absent: a concurrent or repeated insert of the same
    /// fingerprint is a no-op, not an error.
    pub async fn record_posted(&self, rec: &NewPostRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT OR IGNORE INTO posts
              (fingerprint, text, source, url, media_ref, posted_at, external_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&rec.fingerprint)
        .bind(&rec.text)
        .bind(&rec.source)
        .bind(&rec.url)
        .bind(&rec.media_ref)
        .bind(ts(rec.posted_at))
        .bind(&rec.external_id)
        .execute(&self.pool)
        .await
        .context("recording posted item")?;
        Ok(())
    }

    /// Insert-if-absent into the staging cache.
    pub async fn cache_item(&self, item: &CachedItem, created_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r"
            INSERT OR IGNORE INTO cache_items
              (fingerprint, title, description, url, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&item.fingerprint)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.url)
        .bind(&item.source)
        .bind(ts(created_at))
        .execute(&self.pool)
        .await
        .context("caching discovered item")?;
        Ok(())
    }

    /// Most-recently-cached first. Already-posted items are NOT filtered
    /// here; the cache is a staging area and the gate decides at post time.
    pub async fn select_cached(&self, limit: u32) -> Result<Vec<CachedItem>> {
        let rows = sqlx::query(
            r"
            SELECT fingerprint, title, description, url, source
            FROM cache_items ORDER BY id DESC LIMIT ?
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("selecting cached items")?;

        Ok(rows
            .into_iter()
            .map(|r| CachedItem {
                fingerprint: r.get("fingerprint"),
                title: r.get("title"),
                description: r.get("description"),
                url: r.get("url"),
                source: r.get("source"),
            })
            .collect())
    }

    /// Posts with `start <= posted_at < end`. Backs the quota windows.
    pub async fn count_posted_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE posted_at >= ? AND posted_at < ?")
            .bind(ts(start))
            .bind(ts(end))
            .fetch_one(&self.pool)
            .await
            .context("counting posts in window")?;
        let n: i64 = row.get("n");
        Ok(n.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic_and_part_sensitive() {
        let a = fingerprint(&["text", "url", "src"]);
        assert_eq!(a, fingerprint(&["text", "url", "src"]));
        assert_ne!(a, fingerprint(&["text", "url", "other"]));
        assert_ne!(a, fingerprint(&["text", "other", "src"]));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_respects_part_order() {
        assert_ne!(fingerprint(&["a", "b"]), fingerprint(&["b", "a"]));
    }
}
