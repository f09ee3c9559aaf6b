//! Storage module for persisting scraped products
//!
//! Storage is a sink that receives the full product list of a crawl and can
//! read it back. Backends:
//! - [`JsonStorage`]: a pretty-printed JSON array on disk
//! - [`MemoryStorage`]: a process-local list, used for tests

mod json;
mod memory;
mod traits;

pub use json::JsonStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::models::Product;

/// Merges `incoming` into `accumulated`, keyed by product title
///
/// A title seen again replaces the earlier record in place, so the list keeps
/// first-seen order and holds the latest observation for each title.
pub fn merge_products(accumulated: &mut Vec<Product>, incoming: &[Product]) {
    for product in incoming {
        match accumulated.iter_mut().find(|p| p.title == product.title) {
            Some(existing) => *existing = product.clone(),
            None => accumulated.push(product.clone()),
        }
    }
}
