//! Core application logic for the Memory of the World harvester
//!
//! This module contains the main application components: the rate-limited
//! HTTP client, the catalogue crawler and its page fetchers, the link
//! extractor, the download worker pool, the audit manifest, and the run
//! coordinator that ties the phases together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use motw_harvester::app::coordinator::create_shutdown_channel;
//! use motw_harvester::app::{HarvestClient, HttpPageFetcher, RunConfig, RunCoordinator};
//! use motw_harvester::constants::catalogue;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Shared client, plain HTTP page fetcher over the live catalogue
//! let client = Arc::new(HarvestClient::new()?);
//! let fetcher = Arc::new(HttpPageFetcher::new(client.clone(), catalogue::PAGE_URL_BASE));
//!
//! // Run-wide channels: shutdown broadcast and the event stream
//! let (shutdown_tx, _shutdown_rx) = create_shutdown_channel();
//! let (events_tx, mut events_rx) = mpsc::channel(256);
//! tokio::spawn(async move { while events_rx.recv().await.is_some() {} });
//!
//! let coordinator = RunCoordinator::new(
//!     RunConfig::default(),
//!     fetcher,
//!     client,
//!     events_tx,
//!     shutdown_tx,
//! );
//! let report = coordinator.execute().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod crawler;
pub mod events;
pub mod extract;
pub mod manifest;
pub mod models;
pub mod queue;
pub mod worker;

// Re-export main public API
pub use client::{ClientConfig, HarvestClient};
pub use coordinator::{CounterTotals, RunConfig, RunCoordinator, RunReport, ScrapeCounters};
pub use crawler::{
    BrowserPageFetcher, CrawlReport, Crawler, CrawlerConfig, HttpPageFetcher, PageFetcher,
};
pub use events::{emit, HarvestEvent};
pub use extract::LinkExtractor;
pub use manifest::RunManifest;
pub use models::{BookLink, FetchOutcome, LinkOutcome, PageIndex};
pub use queue::LinkQueue;
pub use worker::{DownloadSummary, Downloader, WorkerConfig, WorkerPool};
