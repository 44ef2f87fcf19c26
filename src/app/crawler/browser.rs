//! WebDriver-backed page fetching
//!
//! The library index renders its book list with client-side script, so a
//! plain GET can come back without any anchors. This fetcher drives a real
//! browser through a WebDriver endpoint (chromedriver or geckodriver),
//! navigates to each page, waits briefly for the script to render, and
//! returns the live DOM. One browser session serves the whole crawl and is
//! closed through `shutdown` when the crawl phase ends.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::fetcher::PageFetcher;
use crate::app::models::PageIndex;
use crate::constants::crawler;
use crate::errors::{FetchError, FetchResult};

/// Page fetcher that renders the index through a WebDriver session
pub struct BrowserPageFetcher {
    session: Mutex<Client>,
    base_url: String,
    render_wait: Duration,
}

impl BrowserPageFetcher {
    /// Connect to a WebDriver endpoint and open a browser session
    ///
    /// # Arguments
    ///
    /// * `webdriver_url` - WebDriver endpoint, e.g. `http://localhost:9515`
    /// * `base_url` - Base URL the page number is appended to
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Session` (with page 0, since no page is in
    /// flight yet) if the endpoint is unreachable or refuses a session.
    pub async fn connect(webdriver_url: &str, base_url: impl Into<String>) -> FetchResult<Self> {
        let session = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| FetchError::Session {
                page: 0,
                message: format!("WebDriver session at {} failed: {}", webdriver_url, e),
            })?;

        info!("browser session opened via {}", webdriver_url);

        Ok(Self {
            session: Mutex::new(session),
            base_url: base_url.into(),
            render_wait: crawler::BROWSER_RENDER_WAIT,
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch_page(&self, page: PageIndex) -> FetchResult<String> {
        let url = format!("{}{}", self.base_url, page);
        let mut session = self.session.lock().await;

        session
            .goto(&url)
            .await
            .map_err(|e| session_error(page, "navigation", e))?;

        // Give the page script time to populate the book list
        tokio::time::sleep(self.render_wait).await;

        let html = session
            .source()
            .await
            .map_err(|e| session_error(page, "source retrieval", e))?;

        debug!("rendered page {} ({} bytes)", page, html.len());
        Ok(html)
    }

    async fn shutdown(&self) -> FetchResult<()> {
        // close() consumes the handle; clones share the session, so closing
        // a clone closes the session for all of them
        let session = self.session.lock().await.clone();
        session.close().await.map_err(|e| FetchError::Session {
            page: 0,
            message: format!("session close failed: {}", e),
        })?;

        info!("browser session closed");
        Ok(())
    }

    fn describe(&self) -> &str {
        "browser"
    }
}

fn session_error(page: PageIndex, action: &str, error: fantoccini::error::CmdError) -> FetchError {
    FetchError::Session {
        page,
        message: format!("{} failed: {}", action, error),
    }
}
