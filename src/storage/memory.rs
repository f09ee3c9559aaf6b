use crate::models::Product;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory product storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    products: Mutex<Vec<Product>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> StorageResult<usize> {
        let saves = self.saves.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(*saves)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, products: &[Product]) -> StorageResult<()> {
        let mut stored = self.products.lock().map_err(|_| StorageError::LockPoisoned)?;
        *stored = products.to_vec();
        drop(stored);

        let mut saves = self.saves.lock().map_err(|_| StorageError::LockPoisoned)?;
        *saves += 1;
        Ok(())
    }

    async fn load(&self) -> StorageResult<Vec<Product>> {
        let stored = self.products.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(stored.clone())
    }
}
