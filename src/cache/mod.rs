//! Price cache for change detection
//!
//! The cache maps `product:<title>` keys to the last observed price and
//! outlives individual crawls. Two backends are provided:
//! - [`SqliteCache`]: a SQLite file, persistent across process runs
//! - [`MemoryCache`]: a process-local map, used for tests

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::{CacheError, CacheResult, PriceCache};

use std::path::Path;

/// Opens the persistent price cache at `path`
pub fn open_cache(path: &Path) -> CacheResult<SqliteCache> {
    SqliteCache::new(path)
}
