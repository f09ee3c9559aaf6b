use crate::cache::traits::{CacheError, CacheResult, PriceCache};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory price cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-populated with `entries`
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of the current cache contents
    pub fn snapshot(&self) -> CacheResult<HashMap<String, String>> {
        let entries = self.entries.lock().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl PriceCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
