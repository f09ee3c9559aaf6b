//! JSON file storage implementation

use crate::models::Product;
use crate::storage::traits::{Storage, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Stores products as a pretty-printed JSON array
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a reader never observes a half-written file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn save(&self, products: &[Product]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(products)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(
            "Saved {} products to {}",
            products.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> StorageResult<Vec<Product>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let products = serde_json::from_str(&content)?;
        Ok(products)
    }
}
