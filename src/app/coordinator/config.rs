//! Run configuration
//!
//! Bundles the crawl and download phase configurations with the few settings
//! that belong to the run as a whole.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::crawler::CrawlerConfig;
use crate::app::worker::WorkerConfig;
use crate::constants::files;

/// Configuration for a full harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Crawl phase configuration
    pub crawler: CrawlerConfig,
    /// Download phase configuration
    pub workers: WorkerConfig,
    /// Directory the audit manifest file is created in
    pub manifest_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            workers: WorkerConfig::default(),
            manifest_dir: PathBuf::from(files::DEFAULT_MANIFEST_DIR),
        }
    }
}

impl RunConfig {
    /// Validate both phase configurations
    pub fn validate(&self) -> crate::errors::Result<()> {
        self.crawler.validate()?;
        self.workers.validate()?;
        Ok(())
    }

    /// Drop all pacing delays for maximum crawl speed
    pub fn fast(mut self) -> Self {
        self.crawler = self.crawler.without_delays();
        self
    }
}
