//! Storage traits and error types

use crate::models::Product;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for product storage backends
///
/// `save` replaces the stored product list and may be called several times
/// per crawl.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Replaces the stored products with `products`
    async fn save(&self, products: &[Product]) -> StorageResult<()>;

    /// Loads the stored products; an empty store yields an empty list
    async fn load(&self) -> StorageResult<Vec<Product>>;
}
