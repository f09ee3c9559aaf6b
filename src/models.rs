//! Core value types shared by the crawler and its collaborators

use crate::ShopError;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single product observed on a listing page
///
/// Constructed through [`Product::new`], which guarantees a non-empty title
/// and a finite, non-negative price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product title as extracted; also the deduplication identity
    pub title: String,

    /// Observed price
    pub price: f64,

    /// Local path of the downloaded image, or empty if unavailable
    pub image_path: String,
}

impl Product {
    /// Builds a product, rejecting empty titles and invalid prices
    pub fn new(title: impl Into<String>, price: f64, image_path: impl Into<String>) -> Option<Self> {
        let title = title.into();
        if title.trim().is_empty() || !price.is_finite() || price < 0.0 {
            return None;
        }

        Some(Self {
            title,
            price,
            image_path: image_path.into(),
        })
    }

    /// Cache key used for price-change tracking
    pub fn cache_key(&self) -> String {
        format!("product:{}", self.title)
    }
}

/// Per-invocation crawl options supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Maximum number of pages to crawl; `None` means unbounded
    #[serde(default)]
    pub page_limit: Option<u32>,

    /// Proxy URL that every request of the crawl is routed through
    #[serde(default)]
    pub proxy: Option<String>,
}

impl ScrapeConfig {
    /// Validates the options before a crawl starts
    pub fn validate(&self) -> Result<(), ShopError> {
        if self.page_limit == Some(0) {
            return Err(ShopError::InvalidScrapeConfig(
                "page_limit must be a positive integer".to_string(),
            ));
        }

        if let Some(proxy) = &self.proxy {
            let url = Url::parse(proxy).map_err(|e| {
                ShopError::InvalidScrapeConfig(format!("Invalid proxy URL '{}': {}", proxy, e))
            })?;

            if !matches!(url.scheme(), "http" | "https" | "socks5" | "socks5h") {
                return Err(ShopError::InvalidScrapeConfig(format!(
                    "Unsupported proxy scheme '{}'",
                    url.scheme()
                )));
            }
        }

        Ok(())
    }

    /// Returns true if `page` lies beyond the configured page limit
    pub fn exceeds_limit(&self, page: u32) -> bool {
        self.page_limit.is_some_and(|limit| page > limit)
    }
}

/// Outcome of one crawl invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Number of product observations across all pages
    pub total: u64,

    /// Number of products whose price differed from the cached value
    pub updated: u64,
}

/// Formats a price the way it is written to the price cache
///
/// Two decimals when that is exact, otherwise the shortest representation
/// that parses back to the same value.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price);
    if fixed.parse::<f64>().is_ok_and(|parsed| parsed == price) {
        fixed
    } else {
        price.to_string()
    }
}
