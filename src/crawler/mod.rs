//! Crawler module for listing page fetching and product extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML field extraction with fallback chains
//! - Product image downloads
//! - Overall crawl coordination

mod coordinator;
pub mod extract;
mod fetcher;
mod images;

pub use coordinator::Coordinator;
pub use extract::{extract_product, parse_listing, parse_price, ImageRule, ProductFields};
pub use fetcher::{build_http_client, PageError, PageFetcher, PageOutcome};
pub use images::{sanitize_filename, ImageError, ImageFetcher, FALLBACK_IMAGE_NAME};

use crate::cache::PriceCache;
use crate::config::Settings;
use crate::models::{CrawlResult, ScrapeConfig};
use crate::notify::Notifier;
use crate::storage::Storage;
use crate::ShopError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the request
/// 2. Build the HTTP client for this crawl
/// 3. Fetch listing pages until pagination ends or the page limit is hit
/// 4. Track price changes and persist products
/// 5. Send a completion or failure notification
///
/// # Example
///
/// ```no_run
/// use shop_ripple::cache::MemoryCache;
/// use shop_ripple::crawler::crawl;
/// use shop_ripple::notify::ConsoleNotifier;
/// use shop_ripple::storage::JsonStorage;
/// use shop_ripple::{ScrapeConfig, Settings};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ScrapeConfig { page_limit: Some(2), proxy: None };
/// let result = crawl(
///     Settings::default(),
///     Arc::new(JsonStorage::new("products.json")),
///     Arc::new(MemoryCache::new()),
///     Arc::new(ConsoleNotifier),
///     &request,
/// )
/// .await?;
/// println!("{} products, {} updated", result.total, result.updated);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    settings: Settings,
    storage: Arc<dyn Storage>,
    cache: Arc<dyn PriceCache>,
    notifier: Arc<dyn Notifier>,
    request: &ScrapeConfig,
) -> Result<CrawlResult, ShopError> {
    Coordinator::new(settings, storage, cache, notifier)
        .crawl(request)
        .await
}
