//! SQLite price cache implementation

use crate::cache::schema::initialize_schema;
use crate::cache::traits::{CacheError, CacheResult, PriceCache};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-backed price cache
///
/// The connection is opened once on construction and held for the
/// lifetime of the cache; there is no implicit reconnection. rusqlite is
/// synchronous, so trait calls run their queries on tokio's blocking pool.
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Opens (or creates) the cache database at `path`
    pub fn new(path: &Path) -> CacheResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> CacheResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> CacheResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| CacheError::LockPoisoned)?;
            op(&conn)
        })
        .await?
    }

    /// Number of cached entries
    pub fn len(&self) -> CacheResult<u64> {
        let conn = self.conn.lock().map_err(|_| CacheError::LockPoisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM price_cache", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl PriceCache for SqliteCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM price_cache WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        let (key, value) = (key.to_string(), value.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO price_cache (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = SqliteCache::new_in_memory().unwrap();
        assert_eq!(cache.get("product:Widget").await.unwrap(), None);
        assert!(cache.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = SqliteCache::new_in_memory().unwrap();
        cache.set("product:Widget", "10.00").await.unwrap();
        assert_eq!(
            cache.get("product:Widget").await.unwrap(),
            Some("10.00".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = SqliteCache::new_in_memory().unwrap();
        cache.set("product:Widget", "10.00").await.unwrap();
        cache.set("product:Widget", "12.00").await.unwrap();

        assert_eq!(
            cache.get("product:Widget").await.unwrap(),
            Some("12.00".to_string())
        );
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sets_from_tasks() {
        let cache = Arc::new(SqliteCache::new_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    cache
                        .set(&format!("product:Item {}", i), &format!("{}.00", i))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cache.len().unwrap(), 8);
        assert_eq!(
            cache.get("product:Item 3").await.unwrap(),
            Some("3.00".to_string())
        );
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let cache = SqliteCache::new(&path).unwrap();
            cache.set("product:Widget", "10.00").await.unwrap();
        }

        let reopened = SqliteCache::new(&path).unwrap();
        assert_eq!(
            reopened.get("product:Widget").await.unwrap(),
            Some("10.00".to_string())
        );
    }
}
