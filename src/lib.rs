//! Shop-Ripple: a paginated product catalog crawler
//!
//! This crate walks the pages of an e-commerce product listing, extracts
//! product records (title, price, image), downloads product images, tracks
//! price changes against a persistent cache, and persists the results.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod models;
pub mod notify;
pub mod storage;

use thiserror::Error;

/// Main error type for Shop-Ripple operations
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid scrape request: {0}")]
    InvalidScrapeConfig(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to fetch page {page} after {attempts} attempt(s): {source}")]
    PageFetch {
        page: u32,
        attempts: u32,
        source: crawler::PageError,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Shop-Ripple operations
pub type Result<T> = std::result::Result<T, ShopError>;

// Re-export commonly used types
pub use config::Settings;
pub use crawler::{Coordinator, PageOutcome};
pub use models::{CrawlResult, Product, ScrapeConfig};
