//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used for both index page fetches and book downloads. The client carries no
//! global request timeout: page fetches and chunk reads apply their own
//! deadlines so a large book on a slow link is never cut off by a whole-body
//! clock.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the shared HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User-agent string sent with every request
    pub user_agent: String,
    /// Rate limit shared by page fetches and downloads (requests per second)
    pub rate_limit_rps: u32,
    /// Timeout for fetching one index page
    pub page_timeout: Duration,
    /// Timeout for the initial download response and each chunk read
    pub download_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of connections per host
    pub pool_max_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: random_user_agent(),
            rate_limit_rps: http::DEFAULT_RATE_LIMIT_RPS,
            page_timeout: http::PAGE_TIMEOUT,
            download_timeout: http::DOWNLOAD_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
        }
    }
}

impl ClientConfig {
    /// Create a configuration suitable for tests: no pacing delays worth
    /// waiting for and short timeouts against local mock servers
    pub fn for_testing() -> Self {
        Self {
            rate_limit_rps: 1000,
            page_timeout: Duration::from_secs(5),
            download_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> DownloadResult<()> {
        if self.rate_limit_rps == 0 {
            return Err(DownloadError::ConfigurationError(
                "Rate limit must be non-zero".to_string(),
            ));
        }
        if self.user_agent.is_empty() {
            return Err(DownloadError::ConfigurationError(
                "User agent cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        let mut client_builder = Client::builder()
            .cookie_store(true)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder
            .build()
            .map_err(|e| DownloadError::ConfigurationError(e.to_string()))
    }
}

/// Pick one of the mainstream browser user-agent strings
///
/// The catalogue is served to browsers; a library default user agent invites
/// rejection at the CDN layer.
fn random_user_agent() -> String {
    let index = fastrand::usize(..http::USER_AGENTS.len());
    http::USER_AGENTS[index].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.tcp_nodelay);
        assert!(http::USER_AGENTS.contains(&config.user_agent.as_str()));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = ClientConfig {
            rate_limit_rps: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_http_client_succeeds() {
        let config = ClientConfig::for_testing();
        assert!(config.build_http_client().is_ok());
    }
}
