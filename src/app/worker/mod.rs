//! Download phase: a fixed pool of workers over a shared link queue
//!
//! The crawl produces an ordered batch of book links; this module turns the
//! batch into files on disk. A `Downloader` seeds the queue, spawns the
//! worker pool, and waits for it to drain. Concurrency is bounded by the
//! pool width alone, and every link gets exactly one attempt: a failure is
//! recorded in the outcome log and the worker moves on.
//!
//! Shutdown is cooperative. The coordinator hands `download_all` a broadcast
//! receiver; when a signal arrives each worker finishes the link it is on
//! and exits, so the summary still reflects everything that actually
//! happened.
//!
//! # Module Organization
//!
//! - [`config`] - Pool width, destination directory, dry-run switch
//! - [`core`] - Individual worker loop
//! - [`pool`] - Spawning and joining the workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::app::client::HarvestClient;
use crate::app::coordinator::stats::ScrapeCounters;
use crate::app::events::{emit, HarvestEvent};
use crate::app::manifest::RunManifest;
use crate::app::models::{BookLink, LinkOutcome};
use crate::app::queue::LinkQueue;
use crate::errors::{DownloadError, DownloadResult};

pub mod config;
pub mod core;
pub mod pool;

pub use config::WorkerConfig;
pub use core::DownloadWorker;
pub use pool::WorkerPool;

/// Result of a download phase
#[derive(Debug)]
pub struct DownloadSummary {
    /// Outcome of every link that was processed
    pub outcomes: Vec<LinkOutcome>,
    /// Whether the phase was cut short by a shutdown signal
    pub interrupted: bool,
}

/// Runs the download phase over a batch of discovered links
pub struct Downloader {
    config: WorkerConfig,
    client: Arc<HarvestClient>,
    counters: Arc<ScrapeCounters>,
    manifest: Arc<RunManifest>,
    events: mpsc::Sender<HarvestEvent>,
}

impl Downloader {
    /// Create a downloader sharing the run-wide components
    pub fn new(
        config: WorkerConfig,
        client: Arc<HarvestClient>,
        counters: Arc<ScrapeCounters>,
        manifest: Arc<RunManifest>,
        events: mpsc::Sender<HarvestEvent>,
    ) -> Self {
        Self {
            config,
            client,
            counters,
            manifest,
            events,
        }
    }

    /// Download every link in the batch through the worker pool
    ///
    /// In dry-run mode no directory is created and nothing touches the
    /// network; each link is recorded as planned instead.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::DestinationUnavailable` if the destination
    /// directory cannot be created. Per-link failures are not errors; they
    /// appear as failure outcomes in the summary.
    pub async fn download_all(
        &self,
        links: Vec<BookLink>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> DownloadResult<DownloadSummary> {
        if !self.config.dry_run {
            tokio::fs::create_dir_all(&self.config.destination)
                .await
                .map_err(|source| DownloadError::DestinationUnavailable {
                    path: self.config.destination.clone(),
                    source,
                })?;
        }

        let total = links.len();
        info!(
            "downloading {} links with {} workers into {}{}",
            total,
            self.config.worker_count,
            self.config.destination.display(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );
        emit(
            &self.events,
            HarvestEvent::DownloadStarted { total_links: total },
        );

        let queue = Arc::new(LinkQueue::new());
        queue.add_links(links).await;

        let pool = WorkerPool::spawn(
            self.config.clone(),
            queue.clone(),
            self.client.clone(),
            self.counters.clone(),
            self.manifest.clone(),
            self.events.clone(),
        );

        // Relay the run-wide shutdown signal into each worker's channel.
        // The pool join below always completes because the queue is finite,
        // so the relay is aborted rather than awaited.
        let interrupted_flag = Arc::new(AtomicBool::new(false));
        let relay_flag = interrupted_flag.clone();
        let signal_senders = pool.shutdown_handles();
        let relay = tokio::spawn(async move {
            if shutdown_rx.recv().await.is_ok() {
                relay_flag.store(true, Ordering::SeqCst);
                for sender in signal_senders {
                    let _ = sender.send(()).await;
                }
            }
        });

        pool.join().await;
        relay.abort();

        let outcomes = queue.take_outcomes().await;
        let interrupted = interrupted_flag.load(Ordering::SeqCst);
        if interrupted {
            let unprocessed = queue.pending_count().await;
            warn!(
                "download phase interrupted with {} links unprocessed",
                unprocessed
            );
        }

        let totals = self.counters.snapshot();
        emit(
            &self.events,
            HarvestEvent::DownloadFinished {
                downloaded: totals.downloaded,
                errors: totals.errors,
            },
        );

        Ok(DownloadSummary {
            outcomes,
            interrupted,
        })
    }
}
