use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Shop-Ripple
///
/// Every section and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub listing: ListingConfig,
    pub retry: RetryConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub cache: CacheConfig,
}

/// Listing source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingConfig {
    /// URL of the first listing page; later pages are `<base-url>/page/<n>/`
    pub base_url: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dentalstall.com/shop/".to_string(),
        }
    }
}

/// Page fetch retry policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total number of attempts per page (first try included)
    pub attempts: u32,

    /// Fixed delay between attempts (seconds)
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 5,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Delay between consecutive listing pages (milliseconds)
    pub page_delay_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Accept header sent with every request
    pub accept: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 1000,
            request_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the JSON product file
    pub products_path: String,

    /// Directory that downloaded product images are written to
    pub images_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            products_path: "products.json".to_string(),
            images_dir: "images".to_string(),
        }
    }
}

/// Price cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Path to the SQLite price cache database
    pub database_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: "price_cache.db".to_string(),
        }
    }
}
