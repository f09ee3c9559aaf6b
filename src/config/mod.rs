//! Configuration module for Shop-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use shop_ripple::config::load_config;
//! use std::path::Path;
//!
//! let settings = load_config(Path::new("config.toml")).unwrap();
//! println!("Listing starts at: {}", settings.listing.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, CrawlerConfig, ListingConfig, OutputConfig, RetryConfig, Settings};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
