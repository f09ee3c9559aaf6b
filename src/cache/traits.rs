//! Cache trait and error types

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store holding the last observed price per product
///
/// Concurrent crawls sharing one cache race on writes for the same key;
/// the last write wins.
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Returns the cached value for `key`, if any
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;
}
