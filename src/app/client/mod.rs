//! HTTP client for the library index and file host
//!
//! This module provides a rate-limited HTTP client shared by the crawler and
//! the download workers.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with rate limiting
//! - `download`: Streaming file downloads with durable writes

use std::path::Path;

use crate::app::models::PageIndex;
use crate::constants::files;
use crate::errors::{DownloadResult, FetchResult};

// Module declarations
pub mod config;
pub mod download;
pub mod http;

// Re-export public types
pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// HTTP client for interacting with the library index and file host
///
/// Wraps a single `reqwest` client behind a shared rate limiter so that
/// concurrent workers cannot exceed the configured request rate.
pub struct HarvestClient {
    http_handler: HttpHandler,
    config: ClientConfig,
}

impl HarvestClient {
    /// Creates a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` if the underlying HTTP
    /// client cannot be constructed.
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` if the configuration is
    /// invalid or the underlying HTTP client cannot be constructed.
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        config.validate()?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        Ok(Self {
            http_handler,
            config,
        })
    }

    /// Fetch an index page and return its HTML body
    ///
    /// # Arguments
    ///
    /// * `url` - Fully formed page URL
    /// * `page` - Page number, used for error context
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on connection failure, timeout, or a
    /// non-success HTTP status.
    pub async fn fetch_page_html(&self, url: &str, page: PageIndex) -> FetchResult<String> {
        self.http_handler
            .get_page_html(url, page, self.config.page_timeout)
            .await
    }

    /// Download a file to the destination path, returning bytes written
    ///
    /// The body is streamed in fixed chunks with each chunk synced to disk
    /// before the next is read. A partial file left by a failed download is
    /// removed best-effort.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` on transport failure, timeout, non-success
    /// status, or write failure.
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        let handler = DownloadHandler::new(
            &self.http_handler,
            files::DOWNLOAD_CHUNK_SIZE,
            self.config.download_timeout,
        );
        handler.download_to_file(url, destination).await
    }

    /// Returns the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Client construction succeeds with the default configuration
    #[test]
    fn test_client_creation_with_defaults() {
        let client = HarvestClient::new();
        assert!(client.is_ok());
    }

    /// Client construction fails when the configuration is invalid
    #[test]
    fn test_client_creation_rejects_invalid_config() {
        let config = ClientConfig {
            rate_limit_rps: 0,
            ..ClientConfig::default()
        };
        assert!(HarvestClient::with_config(config).is_err());
    }

    /// Testing configuration builds a working client
    #[test]
    fn test_client_creation_for_testing() {
        let client = HarvestClient::with_config(ClientConfig::for_testing());
        assert!(client.is_ok());
    }
}
