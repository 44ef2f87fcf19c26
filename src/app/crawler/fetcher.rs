//! Page fetching abstraction
//!
//! The crawler only needs "give me the HTML of page N", so that is the whole
//! trait. The plain HTTP implementation lives here; the WebDriver-backed one
//! for script-rendered pages lives in `browser`. Tests script their own
//! implementations to drive the crawl loop without a network.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::app::client::HarvestClient;
use crate::app::models::PageIndex;
use crate::errors::FetchResult;

/// Source of catalogue page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the HTML body of the given catalogue page
    async fn fetch_page(&self, page: PageIndex) -> FetchResult<String>;

    /// Release any session held by the fetcher
    ///
    /// Called once when the crawl phase ends, on every exit path. The
    /// default implementation has nothing to release.
    async fn shutdown(&self) -> FetchResult<()> {
        Ok(())
    }

    /// Short label for logs
    fn describe(&self) -> &str;
}

/// Plain HTTP page fetcher
///
/// Builds the page URL by appending the page number to the configured base
/// and fetches it through the shared rate-limited client.
pub struct HttpPageFetcher {
    client: Arc<HarvestClient>,
    base_url: String,
}

impl HttpPageFetcher {
    /// Create a fetcher over the shared client
    pub fn new(client: Arc<HarvestClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn page_url(&self, page: PageIndex) -> String {
        format!("{}{}", self.base_url, page)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, page: PageIndex) -> FetchResult<String> {
        let url = self.page_url(page);
        debug!("fetching page {} from {}", page, url);
        self.client.fetch_page_html(&url, page).await
    }

    fn describe(&self) -> &str {
        "http"
    }
}
