//! Crawler configuration
//!
//! Pacing and termination policy for the catalogue crawl. Defaults match the
//! live library: start at page one, wait two seconds between page fetches,
//! back off a full minute on connection failures, and give up after three
//! consecutive empty reads of the same page.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::models::PageIndex;
use crate::constants::{catalogue, crawler};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the catalogue crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// First catalogue page to fetch
    pub start_page: PageIndex,
    /// Stop after visiting this many pages (`None` = crawl until exhausted)
    pub page_limit: Option<u32>,
    /// Consecutive empty reads of one page before the catalogue is
    /// considered exhausted
    pub empty_page_attempts: u32,
    /// Pause between page fetches
    pub page_cooldown: Duration,
    /// Pause before retrying a page after a fetch error
    pub connection_backoff: Duration,
    /// Base URL the page number is appended to
    pub index_url_base: String,
    /// Directory to export fetched page HTML into, if set
    pub html_export_dir: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: catalogue::START_PAGE,
            page_limit: None,
            empty_page_attempts: crawler::EMPTY_PAGE_ATTEMPTS,
            page_cooldown: crawler::PAGE_COOLDOWN,
            connection_backoff: crawler::CONNECTION_BACKOFF,
            index_url_base: catalogue::PAGE_URL_BASE.to_string(),
            html_export_dir: None,
        }
    }
}

impl CrawlerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.empty_page_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "empty_page_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.index_url_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "index_url_base".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        if url::Url::parse(&self.index_url_base).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "index_url_base".to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        if let Some(limit) = self.page_limit {
            if limit == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "page_limit".to_string(),
                    reason: "must be at least 1 when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Drop all pacing delays; used by fast mode and tests
    pub fn without_delays(mut self) -> Self {
        self.page_cooldown = Duration::ZERO;
        self.connection_backoff = Duration::ZERO;
        self
    }

    /// Configuration for tests: no delays, no export
    pub fn for_testing() -> Self {
        Self::default().without_delays()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults match the documented pacing constants
    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.start_page, catalogue::START_PAGE);
        assert_eq!(config.page_limit, None);
        assert_eq!(config.empty_page_attempts, crawler::EMPTY_PAGE_ATTEMPTS);
        assert_eq!(config.page_cooldown, crawler::PAGE_COOLDOWN);
        assert_eq!(config.connection_backoff, crawler::CONNECTION_BACKOFF);
        assert!(config.validate().is_ok());
    }

    /// Validation rejects values that would stall or never terminate
    #[test]
    fn test_config_validation() {
        let config = CrawlerConfig {
            empty_page_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlerConfig {
            index_url_base: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlerConfig {
            index_url_base: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlerConfig {
            page_limit: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    /// Fast mode zeroes every delay but changes nothing else
    #[test]
    fn test_without_delays() {
        let config = CrawlerConfig::default().without_delays();
        assert_eq!(config.page_cooldown, Duration::ZERO);
        assert_eq!(config.connection_backoff, Duration::ZERO);
        assert_eq!(config.empty_page_attempts, crawler::EMPTY_PAGE_ATTEMPTS);
    }
}
