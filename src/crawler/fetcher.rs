//! Listing page fetcher
//!
//! This module handles all listing page requests, including:
//! - Building the shared HTTP client (headers, timeouts, optional proxy)
//! - Mapping page numbers to listing URLs
//! - Classifying responses into products, end-of-pages, or failure
//! - Fixed-delay retry of failed pages
//!
//! # Response Classification
//!
//! | Condition                 | Outcome       | Retried |
//! |---------------------------|---------------|---------|
//! | HTTP 200 with products    | `Products`    | -       |
//! | HTTP 200, no `li.product` | `NoMorePages` | no      |
//! | HTTP 404                  | `NoMorePages` | no      |
//! | Other HTTP status         | `Failure`     | yes     |
//! | Transport error           | `Failure`     | yes     |

use crate::config::{CrawlerConfig, RetryConfig};
use crate::crawler::extract::parse_listing;
use crate::crawler::images::ImageFetcher;
use crate::models::Product;
use crate::ShopError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single page attempt failed
#[derive(Debug, Error)]
pub enum PageError {
    #[error("unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("invalid page URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Outcome of fetching one listing page
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was fetched; holds every product with a title and price
    Products(Vec<Product>),

    /// Pagination has ended (404, or a page without product elements)
    NoMorePages,

    /// The attempt failed and may be retried
    Failure(PageError),
}

/// Builds the HTTP client shared by every request of one crawl
///
/// Without a proxy, environment proxy settings are ignored so the crawl
/// talks to the listing host directly.
pub fn build_http_client(config: &CrawlerConfig, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in [(ACCEPT, &config.accept), (ACCEPT_LANGUAGE, &config.accept_language)] {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => tracing::warn!("Ignoring invalid {} header value: {}", name, value),
        }
    }

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    builder = match proxy {
        Some(proxy_url) => builder.proxy(Proxy::all(proxy_url)?),
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Fetches listing pages and turns them into products
#[derive(Debug, Clone)]
pub struct PageFetcher {
    base_url: Url,
    retry: RetryConfig,
    images: ImageFetcher,
}

impl PageFetcher {
    pub fn new(base_url: Url, retry: RetryConfig, images: ImageFetcher) -> Self {
        Self {
            base_url,
            retry,
            images,
        }
    }

    /// URL of listing page `page` (1-based)
    ///
    /// Page 1 is the base URL itself; later pages are `<base>/page/<n>/`.
    pub fn page_url(&self, page: u32) -> Result<Url, PageError> {
        if page <= 1 {
            return Ok(self.base_url.clone());
        }

        let url = format!(
            "{}/page/{}/",
            self.base_url.as_str().trim_end_matches('/'),
            page
        );
        Url::parse(&url).map_err(|e| PageError::InvalidUrl {
            message: e.to_string(),
            url,
        })
    }

    /// Fetches one listing page (single attempt)
    pub async fn fetch_page(&self, client: &Client, page: u32) -> PageOutcome {
        let url = match self.page_url(page) {
            Ok(url) => url,
            Err(e) => return PageOutcome::Failure(e),
        };

        tracing::debug!("Fetching page {}: {}", page, url);

        let response = match client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                return PageOutcome::Failure(PageError::Transport {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!("Page {} returned 404, no more pages", page);
            return PageOutcome::NoMorePages;
        }

        if status != StatusCode::OK {
            tracing::error!("Error fetching page {}: Status {}", page, status.as_u16());
            return PageOutcome::Failure(PageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return PageOutcome::Failure(PageError::Transport {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let listing = parse_listing(&body, &url);
        if listing.element_count == 0 {
            tracing::info!("Page {} has no product elements, no more pages", page);
            return PageOutcome::NoMorePages;
        }

        let mut products = Vec::with_capacity(listing.products.len());
        for fields in listing.products {
            let image_path = match &fields.image_url {
                Some(image_url) => self.images.fetch(client, image_url, &fields.title).await,
                None => String::new(),
            };

            match Product::new(fields.title, fields.price, image_path) {
                Some(product) => {
                    tracing::debug!("Parsed product: {}", product.title);
                    products.push(product);
                }
                None => tracing::warn!("Dropping product with invalid fields on page {}", page),
            }
        }

        tracing::info!(
            "Page {}: {} of {} product elements extracted",
            page,
            products.len(),
            listing.element_count
        );
        PageOutcome::Products(products)
    }

    /// Fetches one listing page, retrying failures
    ///
    /// Makes up to `retry.attempts` attempts with a fixed delay between
    /// them. Returns `Ok(None)` at the end of pagination, and the last
    /// failure once every attempt has failed.
    pub async fn fetch_page_with_retry(
        &self,
        client: &Client,
        page: u32,
    ) -> Result<Option<Vec<Product>>, ShopError> {
        let attempts = self.retry.attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.fetch_page(client, page).await {
                PageOutcome::Products(products) => return Ok(Some(products)),
                PageOutcome::NoMorePages => return Ok(None),
                PageOutcome::Failure(e) if attempt >= attempts => {
                    return Err(ShopError::PageFetch {
                        page,
                        attempts,
                        source: e,
                    });
                }
                PageOutcome::Failure(e) => {
                    tracing::warn!(
                        "Retry {}/{} for page {}: {}",
                        attempt,
                        attempts,
                        page,
                        e
                    );
                    tokio::time::sleep(self.retry.delay()).await;
                    attempt += 1;
                }
            }
        }
    }
}
