//! Individual download worker
//!
//! A worker claims links from the shared queue one at a time, downloads each
//! to the destination directory (or just records the plan in dry-run mode),
//! and records the outcome. A failed link is recorded and never retried; the
//! next link is claimed immediately. Workers exit when the queue is drained
//! or a shutdown signal arrives between links.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::WorkerConfig;
use crate::app::client::HarvestClient;
use crate::app::coordinator::stats::ScrapeCounters;
use crate::app::events::{emit, HarvestEvent};
use crate::app::manifest::RunManifest;
use crate::app::models::{BookLink, FetchOutcome, LinkOutcome};
use crate::app::queue::LinkQueue;

/// Worker that drains the link queue
pub struct DownloadWorker {
    id: usize,
    config: WorkerConfig,
    queue: Arc<LinkQueue>,
    client: Arc<HarvestClient>,
    counters: Arc<ScrapeCounters>,
    manifest: Arc<RunManifest>,
    events: mpsc::Sender<HarvestEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl DownloadWorker {
    /// Create a new download worker
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        config: WorkerConfig,
        queue: Arc<LinkQueue>,
        client: Arc<HarvestClient>,
        counters: Arc<ScrapeCounters>,
        manifest: Arc<RunManifest>,
        events: mpsc::Sender<HarvestEvent>,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            id,
            config,
            queue,
            client,
            counters,
            manifest,
            events,
            shutdown_rx,
        }
    }

    /// Run until the queue is drained or shutdown is signalled
    pub async fn run(mut self) {
        debug!("worker {} starting", self.id);
        let mut processed = 0usize;

        loop {
            if self.check_shutdown() {
                info!("worker {} stopping on shutdown signal", self.id);
                break;
            }

            let link = match self.queue.claim_next().await {
                Some(link) => link,
                // The queue never refills once the crawl is done, so an
                // empty queue means this worker is finished
                None => break,
            };

            let outcome = self.process_link(&link).await;
            self.queue.record_outcome(LinkOutcome { link, outcome }).await;
            processed += 1;
        }

        debug!("worker {} done after {} links", self.id, processed);
    }

    /// Download one link, or record what would be downloaded in dry-run mode
    async fn process_link(&self, link: &BookLink) -> FetchOutcome {
        let file_name = link.file_name();

        if self.config.dry_run {
            info!("worker {} would download {}", self.id, file_name);
            self.manifest.record_planned(&file_name).await;
            self.counters.record_download();
            emit(&self.events, HarvestEvent::LinkPlanned { file_name });
            return FetchOutcome::Success { bytes_written: 0 };
        }

        let destination = self.config.destination.join(&file_name);
        debug!(
            "worker {} downloading {} -> {}",
            self.id,
            link.url,
            destination.display()
        );

        match self.client.download_to_file(&link.url, &destination).await {
            Ok(bytes_written) => {
                info!(
                    "worker {} downloaded {} ({} bytes)",
                    self.id, file_name, bytes_written
                );
                self.manifest
                    .record_downloaded(&file_name, bytes_written)
                    .await;
                self.counters.record_download();
                emit(
                    &self.events,
                    HarvestEvent::LinkCompleted {
                        worker_id: self.id,
                        file_name,
                        bytes_written,
                    },
                );
                FetchOutcome::Success { bytes_written }
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("worker {} failed on {}: {}", self.id, link.url, reason);
                self.manifest.record_failed(&link.url, &reason).await;
                self.counters.record_error();
                emit(
                    &self.events,
                    HarvestEvent::LinkFailed {
                        worker_id: self.id,
                        url: link.url.clone(),
                        reason: reason.clone(),
                    },
                );
                FetchOutcome::Failure { reason }
            }
        }
    }

    /// Check for a pending shutdown signal without blocking
    fn check_shutdown(&mut self) -> bool {
        match self.shutdown_rx.try_recv() {
            Ok(()) => true,
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => true,
        }
    }
}
