use crate::config::types::{CacheConfig, ListingConfig, OutputConfig, RetryConfig, Settings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_listing_config(&settings.listing)?;
    validate_retry_config(&settings.retry)?;
    validate_output_config(&settings.output)?;
    validate_cache_config(&settings.cache)?;
    Ok(())
}

/// Validates the listing base URL
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use HTTP or HTTPS scheme",
            config.base_url
        )));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.products_path.is_empty() {
        return Err(ConfigError::Validation(
            "products-path cannot be empty".to_string(),
        ));
    }

    if config.images_dir.is_empty() {
        return Err(ConfigError::Validation(
            "images-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "cache database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
