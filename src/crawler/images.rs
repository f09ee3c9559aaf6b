//! Product image downloads
//!
//! Failures never escape this module: any non-200 response, transport error
//! or filesystem error is logged and reported as an empty path.

use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use thiserror::Error;

/// File stem used when a title sanitizes to nothing
pub const FALLBACK_IMAGE_NAME: &str = "default_image";

/// Reasons an image download is abandoned
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads product images into a fixed directory
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    images_dir: PathBuf,
}

impl ImageFetcher {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    /// Destination path of the image for `title`
    pub fn image_path(&self, title: &str) -> PathBuf {
        self.images_dir
            .join(format!("{}.jpg", sanitize_filename(title)))
    }

    /// Downloads `url` and stores it under the product's image path
    ///
    /// Returns the written path, or an empty string on any failure.
    pub async fn fetch(&self, client: &Client, url: &str, title: &str) -> String {
        match self.try_fetch(client, url, title).await {
            Ok(Some(path)) => path.to_string_lossy().into_owned(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::error!("Error downloading image from {}: {}", url, e);
                String::new()
            }
        }
    }

    async fn try_fetch(
        &self,
        client: &Client,
        url: &str,
        title: &str,
    ) -> Result<Option<PathBuf>, ImageError> {
        let response = client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            tracing::warn!(
                "Failed to download image from {}: Status {}",
                url,
                status.as_u16()
            );
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let path = self.image_path(title);

        tokio::fs::create_dir_all(&self.images_dir).await?;
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!("Saved image for '{}' to {}", title, path.display());
        Ok(Some(path))
    }
}

/// Turns a product title into a filesystem-safe file stem
///
/// Keeps alphanumerics, spaces, hyphens and underscores, then trims trailing
/// whitespace. An empty result becomes [`FALLBACK_IMAGE_NAME`].
pub fn sanitize_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim_end();

    if safe.is_empty() {
        FALLBACK_IMAGE_NAME.to_string()
    } else {
        safe.to_string()
    }
}
