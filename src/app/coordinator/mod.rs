//! Run orchestration
//!
//! The coordinator drives a run through its two strictly sequential phases:
//! crawl the catalogue, then download everything that was discovered. It
//! owns the shutdown story for a run: the crawl runs under a select against
//! the shutdown channel (interrupting it skips the downloads entirely), the
//! download phase receives its own subscription and stops between links, and
//! the page fetcher is released on every exit path so a browser session is
//! never leaked.
//!
//! A `RunReport` comes back on every non-fatal path. The counters feeding it
//! are updated live by the phases, so a report after an interrupt is just as
//! accurate as one after a clean finish.
//!
//! # Module Organization
//!
//! - [`config`] - Run configuration bundling both phases
//! - [`stats`] - Live counters and the final report
//! - [`signals`] - Shutdown channel and the CTRL-C/SIGTERM listener

pub mod config;
pub mod signals;
pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::app::client::HarvestClient;
use crate::app::crawler::{CrawlReport, Crawler, PageFetcher};
use crate::app::events::HarvestEvent;
use crate::app::extract::LinkExtractor;
use crate::app::manifest::RunManifest;
use crate::app::worker::Downloader;

pub use config::RunConfig;
pub use signals::{create_shutdown_channel, spawn_signal_listener};
pub use stats::{CounterTotals, RunReport, ScrapeCounters};

/// Drives one harvest run from crawl to report
pub struct RunCoordinator {
    config: RunConfig,
    fetcher: Arc<dyn PageFetcher>,
    client: Arc<HarvestClient>,
    events: mpsc::Sender<HarvestEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RunCoordinator {
    /// Create a coordinator for one run
    pub fn new(
        config: RunConfig,
        fetcher: Arc<dyn PageFetcher>,
        client: Arc<HarvestClient>,
        events: mpsc::Sender<HarvestEvent>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            config,
            fetcher,
            client,
            events,
            shutdown_tx,
        }
    }

    /// Run both phases and produce the final report
    ///
    /// # Errors
    ///
    /// Fails only on conditions that make the run impossible: invalid
    /// configuration, an uncreatable manifest file, or an unavailable
    /// destination directory. Interruption is not an error; it produces a
    /// report with the `interrupted` flag set.
    pub async fn execute(&self) -> crate::errors::Result<RunReport> {
        self.config.validate()?;

        let started_at = Utc::now();
        let start = Instant::now();
        let counters = Arc::new(ScrapeCounters::new());
        let manifest = Arc::new(RunManifest::create(&self.config.manifest_dir).await?);

        // Subscribe both phases up front so a signal between phases is not
        // lost
        let mut crawl_shutdown = self.shutdown_tx.subscribe();
        let download_shutdown = self.shutdown_tx.subscribe();

        let crawl_report = match self
            .crawl_phase(&counters, &manifest, &mut crawl_shutdown)
            .await
        {
            Some(report) => report,
            None => {
                info!("interrupted during crawl, skipping downloads");
                return Ok(self.build_report(&counters, 0, started_at, start, true));
            }
        };

        let downloader = Downloader::new(
            self.config.workers.clone(),
            self.client.clone(),
            counters.clone(),
            manifest.clone(),
            self.events.clone(),
        );
        let summary = downloader
            .download_all(crawl_report.links, download_shutdown)
            .await?;

        let report = self.build_report(
            &counters,
            crawl_report.pages_visited,
            started_at,
            start,
            summary.interrupted,
        );
        info!("run finished: {}", report.summary());
        Ok(report)
    }

    /// Run only the crawl phase and return what it discovered
    ///
    /// Used by the crawl command. Interruption yields an empty report; the
    /// manifest still holds every link discovered before the signal.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or an uncreatable manifest file.
    pub async fn crawl_once(&self) -> crate::errors::Result<CrawlReport> {
        self.config.validate()?;

        let counters = Arc::new(ScrapeCounters::new());
        let manifest = Arc::new(RunManifest::create(&self.config.manifest_dir).await?);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let report = self
            .crawl_phase(&counters, &manifest, &mut shutdown_rx)
            .await
            .unwrap_or(CrawlReport {
                links: Vec::new(),
                pages_visited: 0,
            });
        Ok(report)
    }

    /// Crawl under the shutdown signal; `None` means interrupted
    ///
    /// The fetcher is shut down on both paths, releasing any browser
    /// session the crawl was using.
    async fn crawl_phase(
        &self,
        counters: &Arc<ScrapeCounters>,
        manifest: &Arc<RunManifest>,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> Option<CrawlReport> {
        let crawler = Crawler::new(
            self.fetcher.clone(),
            LinkExtractor::new(),
            self.config.crawler.clone(),
            counters.clone(),
            manifest.clone(),
            self.events.clone(),
        );

        let outcome = tokio::select! {
            report = crawler.crawl() => Some(report),
            _ = shutdown_rx.recv() => None,
        };

        if let Err(e) = self.fetcher.shutdown().await {
            warn!("page fetcher shutdown failed: {}", e);
        }

        outcome
    }

    fn build_report(
        &self,
        counters: &ScrapeCounters,
        pages_visited: u32,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
        interrupted: bool,
    ) -> RunReport {
        RunReport {
            totals: counters.snapshot(),
            pages_visited,
            started_at,
            duration: start.elapsed(),
            interrupted,
            dry_run: self.config.workers.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    use crate::app::client::ClientConfig;
    use crate::app::models::PageIndex;
    use crate::app::worker::WorkerConfig;
    use crate::errors::FetchResult;

    /// Serves a fixed list of page bodies by index; later pages are empty
    struct FixedPages {
        pages: Vec<String>,
        shutdowns: AtomicUsize,
    }

    impl FixedPages {
        fn new(pages: Vec<String>) -> Self {
            Self {
                pages,
                shutdowns: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FixedPages {
        async fn fetch_page(&self, page: PageIndex) -> FetchResult<String> {
            let index = (page - 1) as usize;
            Ok(self
                .pages
                .get(index)
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string()))
        }

        async fn shutdown(&self) -> FetchResult<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn describe(&self) -> &str {
            "fixed"
        }
    }

    /// Fetcher that never returns, for driving the interrupt path
    struct StalledFetcher {
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for StalledFetcher {
        async fn fetch_page(&self, _page: PageIndex) -> FetchResult<String> {
            std::future::pending().await
        }

        async fn shutdown(&self) -> FetchResult<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn describe(&self) -> &str {
            "stalled"
        }
    }

    fn book_page(urls: &[&str]) -> String {
        let anchors: String = urls
            .iter()
            .map(|u| format!("<a href=\"{}\">book</a>", u))
            .collect();
        format!("<html><body>{}</body></html>", anchors)
    }

    fn test_config(temp_dir: &TempDir, dry_run: bool) -> RunConfig {
        RunConfig {
            crawler: crate::app::crawler::CrawlerConfig::for_testing(),
            workers: WorkerConfig {
                worker_count: 2,
                destination: temp_dir.path().join("books"),
                dry_run,
            },
            manifest_dir: temp_dir.path().to_path_buf(),
        }
    }

    fn test_client() -> Arc<HarvestClient> {
        Arc::new(HarvestClient::with_config(ClientConfig::for_testing()).unwrap())
    }

    /// A dry run goes through both phases and reports accurate totals
    #[tokio::test]
    async fn test_execute_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(FixedPages::new(vec![
            book_page(&[
                "https://example.org/b/One.pdf",
                "https://example.org/b/Two.epub",
            ]),
            book_page(&["https://example.org/b/Three.djvu"]),
        ]));
        let (shutdown_tx, _rx) = create_shutdown_channel();
        let (events, _events_rx) = mpsc::channel(256);

        let coordinator = RunCoordinator::new(
            test_config(&temp_dir, true),
            fetcher.clone(),
            test_client(),
            events,
            shutdown_tx,
        );

        let report = coordinator.execute().await.unwrap();

        assert!(!report.interrupted);
        assert!(report.dry_run);
        assert_eq!(report.totals.links_found, 3);
        assert_eq!(report.totals.downloaded, 3);
        assert_eq!(report.totals.errors, 0);
        assert_eq!(report.pages_visited, 3);

        // Fetcher released exactly once, dry run never touched the
        // destination
        assert_eq!(fetcher.shutdowns.load(Ordering::SeqCst), 1);
        assert!(!temp_dir.path().join("books").exists());
    }

    /// A shutdown signal during the crawl skips downloads and still
    /// produces a report with the fetcher released
    #[tokio::test]
    async fn test_interrupt_during_crawl() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StalledFetcher {
            shutdowns: AtomicUsize::new(0),
        });
        let (shutdown_tx, _rx) = create_shutdown_channel();
        let (events, _events_rx) = mpsc::channel(256);

        let coordinator = RunCoordinator::new(
            test_config(&temp_dir, false),
            fetcher.clone(),
            test_client(),
            events,
            shutdown_tx.clone(),
        );

        let execute = tokio::spawn(async move { coordinator.execute().await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();

        let report = execute.await.unwrap().unwrap();
        assert!(report.interrupted);
        assert_eq!(report.totals.links_found, 0);
        assert_eq!(report.totals.downloaded, 0);
        assert_eq!(fetcher.shutdowns.load(Ordering::SeqCst), 1);

        // Downloads were skipped entirely
        assert!(!temp_dir.path().join("books").exists());
    }

    /// crawl_once returns discovered links without running downloads
    #[tokio::test]
    async fn test_crawl_once() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(FixedPages::new(vec![book_page(&[
            "https://example.org/b/Solo.pdf",
        ])]));
        let (shutdown_tx, _rx) = create_shutdown_channel();
        let (events, _events_rx) = mpsc::channel(256);

        let coordinator = RunCoordinator::new(
            test_config(&temp_dir, false),
            fetcher.clone(),
            test_client(),
            events,
            shutdown_tx,
        );

        let report = coordinator.crawl_once().await.unwrap();
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].url, "https://example.org/b/Solo.pdf");
        assert_eq!(report.pages_visited, 2);
        assert_eq!(fetcher.shutdowns.load(Ordering::SeqCst), 1);
        assert!(!temp_dir.path().join("books").exists());
    }

    /// An uncreatable manifest directory fails the run before any fetch
    #[tokio::test]
    async fn test_missing_manifest_dir_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir, false);
        config.manifest_dir = temp_dir.path().join("missing");

        let fetcher = Arc::new(FixedPages::new(Vec::new()));
        let (shutdown_tx, _rx) = create_shutdown_channel();
        let (events, _events_rx) = mpsc::channel(256);

        let coordinator =
            RunCoordinator::new(config, fetcher, test_client(), events, shutdown_tx);

        assert!(coordinator.execute().await.is_err());
    }
}
