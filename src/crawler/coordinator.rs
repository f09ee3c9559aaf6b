//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that:
//! - Creates one HTTP client per crawl and drops it on every exit path
//! - Walks listing pages in increasing order until pagination ends
//! - Detects price changes against the price cache
//! - Persists the accumulated products after every page
//! - Emits completion and failure notifications

use crate::cache::PriceCache;
use crate::config::Settings;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::images::ImageFetcher;
use crate::models::{format_price, CrawlResult, Product, ScrapeConfig};
use crate::notify::Notifier;
use crate::storage::{merge_products, Storage};
use crate::{ConfigError, ShopError};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Main crawler coordinator structure
///
/// Collaborators are injected on construction. The coordinator itself holds
/// no per-crawl state, so one instance can serve several crawls.
pub struct Coordinator {
    settings: Arc<Settings>,
    storage: Arc<dyn Storage>,
    cache: Arc<dyn PriceCache>,
    notifier: Arc<dyn Notifier>,
}

/// Mutable state of a single crawl
#[derive(Default)]
struct CrawlProgress {
    result: CrawlResult,
    products: Vec<Product>,
    pages_saved: u32,
}

impl Coordinator {
    pub fn new(
        settings: Settings,
        storage: Arc<dyn Storage>,
        cache: Arc<dyn PriceCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            storage,
            cache,
            notifier,
        }
    }

    /// Runs one crawl invocation
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Pagination ended or the page limit was reached
    /// * `Err(ShopError)` - The request was invalid, or a page (or the
    ///   cache/storage) failed; a failure notification has been sent
    pub async fn crawl(&self, request: &ScrapeConfig) -> Result<CrawlResult, ShopError> {
        request.validate()?;

        let base_url = Url::parse(&self.settings.listing.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let fetcher = PageFetcher::new(
            base_url,
            self.settings.retry.clone(),
            ImageFetcher::new(&self.settings.output.images_dir),
        );

        let client = build_http_client(&self.settings.crawler, request.proxy.as_deref())?;
        if let Some(proxy) = &request.proxy {
            tracing::info!("Routing crawl through proxy {}", proxy);
        }

        let outcome = self.run(&client, &fetcher, request).await;

        // The session ends here regardless of how the crawl ended
        drop(client);

        outcome
    }

    async fn run(
        &self,
        client: &Client,
        fetcher: &PageFetcher,
        request: &ScrapeConfig,
    ) -> Result<CrawlResult, ShopError> {
        let start_time = std::time::Instant::now();
        let mut progress = CrawlProgress::default();
        let mut page: u32 = 1;

        loop {
            if request.exceeds_limit(page) {
                tracing::info!("Reached page limit of {}", page - 1);
                break;
            }

            let products = match fetcher.fetch_page_with_retry(client, page).await {
                Ok(Some(products)) if !products.is_empty() => products,
                Ok(_) => {
                    tracing::info!("No products on page {}, pagination ended", page);
                    break;
                }
                Err(e) => return Err(self.fail(page, e).await),
            };

            if let Err(e) = self.process_page(page, &products, &mut progress).await {
                return Err(self.fail(page, e).await);
            }

            page += 1;

            if !request.exceeds_limit(page) {
                tokio::time::sleep(self.settings.crawler.page_delay()).await;
            }
        }

        if progress.pages_saved == 0 {
            if let Err(e) = self.storage.save(&[]).await {
                let error = ShopError::from(e);
                tracing::error!("Saving the empty product list failed: {}", error);
                self.notifier
                    .notify(&format!("Error saving scraped products: {}", error))
                    .await;
                return Err(error);
            }
        }

        let result = progress.result;
        tracing::info!(
            "Crawl completed: {} products ({} updated) in {:?}",
            result.total,
            result.updated,
            start_time.elapsed()
        );

        self.notifier
            .notify(&format!(
                "Scraping completed. Total products: {}, Updated: {}",
                result.total, result.updated
            ))
            .await;

        Ok(result)
    }

    /// Applies one page of products to the cache, counters, and storage
    ///
    /// Products are applied in extraction order.
    async fn process_page(
        &self,
        page: u32,
        products: &[Product],
        progress: &mut CrawlProgress,
    ) -> Result<(), ShopError> {
        for product in products {
            if self.record_price(product).await? {
                progress.result.updated += 1;
            }
            progress.result.total += 1;
        }

        merge_products(&mut progress.products, products);
        self.storage.save(&progress.products).await?;
        progress.pages_saved += 1;

        tracing::debug!(
            "Page {} applied: {} products stored, {} observed so far",
            page,
            progress.products.len(),
            progress.result.total
        );
        Ok(())
    }

    /// Compares `product` against the cache and stores its new price
    ///
    /// Returns true if the price is new or changed. Cached values that do
    /// not parse as a number count as changed.
    async fn record_price(&self, product: &Product) -> Result<bool, ShopError> {
        let key = product.cache_key();
        let cached = self.cache.get(&key).await?;

        let changed = match cached.as_deref().map(str::parse::<f64>) {
            Some(Ok(previous)) => previous != product.price,
            Some(Err(_)) | None => true,
        };

        if changed {
            tracing::debug!(
                "Price change for '{}': {} -> {}",
                product.title,
                cached.as_deref().unwrap_or("none"),
                product.price
            );
            self.cache.set(&key, &format_price(product.price)).await?;
        }

        Ok(changed)
    }

    /// Sends the failure notification for `page` and hands back the error
    async fn fail(&self, page: u32, error: ShopError) -> ShopError {
        tracing::error!("Crawl aborted at page {}: {}", page, error);
        self.notifier
            .notify(&format!("Error during scraping page {}: {}", page, error))
            .await;
        error
    }
}
