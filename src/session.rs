//! HTTP session with a transparent SQLite response cache.
//!
//! Mirrors what a caching HTTP session gives the routines: repeat runs hit
//! the local cache instead of the network. Only text pages are cached; the
//! binary archive download always goes to the network.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::constants::CACHE_DB_PATH;
use crate::error::{Result, ScrapeError};

pub struct CachedSession {
    client: reqwest::Client,
    conn: Connection,
}

impl CachedSession {
    pub fn new() -> anyhow::Result<Self> {
        if let Some(dir) = Path::new(CACHE_DB_PATH).parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
        }
        let conn = Connection::open(CACHE_DB_PATH)
            .with_context(|| format!("failed to open response cache {CACHE_DB_PATH}"))?;
        cache_init(&conn)?;
        Ok(Self {
            client: reqwest::Client::new(),
            conn,
        })
    }

    /// Drop every cached response.
    pub fn clear(&self) -> anyhow::Result<()> {
        cache_clear(&self.conn)?;
        debug!("response cache cleared");
        Ok(())
    }

    /// Page body for `url`: cached copy if present, otherwise one GET.
    ///
    /// The body is decoded as UTF-8 regardless of response headers, since the
    /// source pages do not reliably declare their encoding. Transport errors
    /// (including non-2xx) come back as [`ScrapeError::FetchFailed`]; no
    /// retry is attempted here.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        if let Some(body) = cache_get(&self.conn, url)? {
            debug!(url, "cache hit");
            return Ok(body);
        }
        let bytes = self.get_raw(url).await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        cache_put(&self.conn, url, &body)?;
        Ok(body)
    }

    /// Uncached binary GET, for artifact downloads.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.get_raw(url).await
    }

    async fn get_raw(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_failed = |source| ScrapeError::FetchFailed {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_failed)?;
        let bytes = response.bytes().await.map_err(fetch_failed)?;
        debug!(url, len = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

fn cache_init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS responses (
            url        TEXT PRIMARY KEY,
            body       TEXT NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )
}

fn cache_get(conn: &Connection, url: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT body FROM responses WHERE url = ?1",
        params![url],
        |row| row.get(0),
    )
    .optional()
}

fn cache_put(conn: &Connection, url: &str, body: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO responses (url, body) VALUES (?1, ?2)",
        params![url, body],
    )?;
    Ok(())
}

fn cache_clear(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM responses", [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        cache_init(&conn).unwrap();
        conn
    }

    #[test]
    fn miss_then_hit() {
        let conn = conn();
        assert_eq!(cache_get(&conn, "https://a/").unwrap(), None);
        cache_put(&conn, "https://a/", "<html>a</html>").unwrap();
        assert_eq!(
            cache_get(&conn, "https://a/").unwrap().as_deref(),
            Some("<html>a</html>")
        );
    }

    #[test]
    fn put_replaces_existing_body() {
        let conn = conn();
        cache_put(&conn, "https://a/", "old").unwrap();
        cache_put(&conn, "https://a/", "new").unwrap();
        assert_eq!(cache_get(&conn, "https://a/").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn clear_empties_the_cache() {
        let conn = conn();
        cache_put(&conn, "https://a/", "a").unwrap();
        cache_put(&conn, "https://b/", "b").unwrap();
        cache_clear(&conn).unwrap();
        assert_eq!(cache_get(&conn, "https://a/").unwrap(), None);
        assert_eq!(cache_get(&conn, "https://b/").unwrap(), None);
    }
}
