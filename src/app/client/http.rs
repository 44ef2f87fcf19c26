//! Core HTTP operations with rate limiting
//!
//! This module provides the raw HTTP requests behind page fetches and
//! downloads. Requests are paced by a shared rate limiter with jitter.
//! There is deliberately no retry here: the crawler owns all retry and
//! backoff policy, and a download failure is terminal for its link.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use tracing::debug;

use crate::app::models::PageIndex;
use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult, FetchError, FetchResult};

/// Rate-limited HTTP request handler shared by fetch and download paths
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limit
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> DownloadResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Builds the rate limiter with the specified rate limit
    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> DownloadResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            DownloadError::ConfigurationError("Rate limit must be non-zero".to_string())
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Wait for a rate-limit slot, with jitter to avoid lockstep requests
    async fn pace(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(http::RATE_LIMIT_JITTER))
            .await;
    }

    /// Fetch one index page as HTML text
    ///
    /// Applies the page timeout to both the request and the body read and
    /// classifies failures into the transient fetch-error taxonomy the
    /// crawler retries against. A non-success status is an error; a success
    /// with an empty or linkless body is not.
    ///
    /// # Arguments
    ///
    /// * `url` - Fully built page URL
    /// * `page` - Page number, carried into error context
    /// * `timeout` - Deadline for the request and for the body read
    pub async fn get_page_html(
        &self,
        url: &str,
        page: PageIndex,
        timeout: Duration,
    ) -> FetchResult<String> {
        self.pace().await;

        let response = match tokio::time::timeout(timeout, self.client.get(url).send()).await {
            Err(_) => {
                return Err(FetchError::Timeout {
                    page,
                    seconds: timeout.as_secs(),
                })
            }
            Ok(Err(e)) => return Err(classify_fetch_error(page, timeout, &e)),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                page,
                status: status.as_u16(),
            });
        }

        let text = match tokio::time::timeout(timeout, response.text()).await {
            Err(_) => {
                return Err(FetchError::Timeout {
                    page,
                    seconds: timeout.as_secs(),
                })
            }
            Ok(Err(e)) => return Err(classify_fetch_error(page, timeout, &e)),
            Ok(Ok(text)) => text,
        };

        debug!("fetched page {} ({} bytes)", page, text.len());
        Ok(text)
    }

    /// Issue a download GET and return the raw response for streaming
    ///
    /// The timeout covers the time to the response headers; chunk reads are
    /// the download handler's concern. Status checking is left to the caller
    /// so it can map the status with URL context.
    pub async fn get_response(
        &self,
        url: &str,
        timeout: Duration,
    ) -> DownloadResult<reqwest::Response> {
        self.pace().await;

        match tokio::time::timeout(timeout, self.client.get(url).send()).await {
            Err(_) => Err(DownloadError::Timeout {
                url: url.to_string(),
                seconds: timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(DownloadError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok(response)) => Ok(response),
        }
    }
}

/// Map a reqwest error into the crawler's transient taxonomy
fn classify_fetch_error(page: PageIndex, timeout: Duration, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            page,
            seconds: timeout.as_secs(),
        }
    } else {
        FetchError::Connection {
            page,
            message: error.to_string(),
        }
    }
}
