//! Prelude module for the Memory of the World harvester library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use motw_harvester::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use motw_harvester::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // All common types are now available
//!     let client = Arc::new(HarvestClient::new()?);
//!     let fetcher = Arc::new(HttpPageFetcher::new(client.clone(), PAGE_URL_BASE));
//!
//!     // Continue with run setup...
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    BookLink,
    BrowserPageFetcher,
    ClientConfig,
    CrawlReport,
    // Crawl phase
    Crawler,
    CrawlerConfig,
    // Download phase
    Downloader,
    // Client
    HarvestClient,
    HarvestEvent,
    HttpPageFetcher,
    LinkExtractor,
    LinkQueue,
    PageFetcher,
    // Core orchestration
    RunConfig,
    RunCoordinator,
    RunManifest,
    RunReport,
    ScrapeCounters,
    WorkerConfig,
};

// Shutdown plumbing used by every embedding
pub use crate::app::coordinator::{create_shutdown_channel, spawn_signal_listener};

// Commonly used constants
pub use crate::constants::{
    DEFAULT_RATE_LIMIT_RPS, DEFAULT_WORKER_COUNT, PAGE_URL_BASE, START_PAGE,
};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

// Common external crate re-exports for convenience
// Note: Only re-export types that users will commonly need,
// not the entire crates which would pollute the namespace
pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        // Verify that all essential types are available through prelude
        let _client_config = ClientConfig::default();
        let _crawler_config = CrawlerConfig::default();
        let _run_config = RunConfig::default();
        let _worker_config = WorkerConfig::default();

        // Test that constants are available
        assert_eq!(DEFAULT_WORKER_COUNT, 5);
        assert_eq!(START_PAGE, 1);
    }

    #[tokio::test]
    async fn test_prelude_integration_pattern() {
        // Test that the common integration pattern works with prelude imports
        let client = Arc::new(HarvestClient::with_config(ClientConfig::for_testing()).unwrap());
        let fetcher = Arc::new(HttpPageFetcher::new(client.clone(), PAGE_URL_BASE));

        // Verify basic functionality
        let queue = Arc::new(LinkQueue::new());
        assert_eq!(queue.pending_count().await, 0);
        assert_eq!(fetcher.describe(), "http");
    }

    #[test]
    fn test_std_reexports() {
        // Test that standard library re-exports work
        let _path = PathBuf::from("/tmp/test");

        // Arc should be available for shared ownership patterns
        let data = Arc::new(42);
        assert_eq!(*data, 42);
    }
}
