//! Worker pool lifecycle
//!
//! Spawns the configured number of download workers over a shared queue and
//! waits for them. Each worker carries its own shutdown channel so a signal
//! reaches every worker even while some are mid-download; the pool itself
//! only hands out the senders and joins the tasks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::WorkerConfig;
use super::core::DownloadWorker;
use crate::app::client::HarvestClient;
use crate::app::coordinator::stats::ScrapeCounters;
use crate::app::events::HarvestEvent;
use crate::app::manifest::RunManifest;
use crate::app::queue::LinkQueue;
use crate::constants::workers;

/// Pool of running download workers
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown_senders: Vec<mpsc::Sender<()>>,
}

impl WorkerPool {
    /// Spawn all workers immediately
    pub fn spawn(
        config: WorkerConfig,
        queue: Arc<LinkQueue>,
        client: Arc<HarvestClient>,
        counters: Arc<ScrapeCounters>,
        manifest: Arc<RunManifest>,
        events: mpsc::Sender<HarvestEvent>,
    ) -> Self {
        info!("starting {} workers", config.worker_count);

        let mut handles = Vec::with_capacity(config.worker_count);
        let mut shutdown_senders = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            let (shutdown_tx, shutdown_rx) = mpsc::channel(workers::SHUTDOWN_CHANNEL_BUFFER);

            let worker = DownloadWorker::new(
                worker_id,
                config.clone(),
                queue.clone(),
                client.clone(),
                counters.clone(),
                manifest.clone(),
                events.clone(),
                shutdown_rx,
            );

            handles.push(tokio::spawn(worker.run()));
            shutdown_senders.push(shutdown_tx);
        }

        Self {
            handles,
            shutdown_senders,
        }
    }

    /// Senders that deliver a shutdown signal to each worker
    pub fn shutdown_handles(&self) -> Vec<mpsc::Sender<()>> {
        self.shutdown_senders.clone()
    }

    /// Number of spawned workers
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to finish
    ///
    /// Workers terminate on their own once the queue drains, so this always
    /// completes. A panicked worker task is logged and does not abort the
    /// join.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("worker task failed: {}", e);
            }
        }
        info!("all workers finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::ClientConfig;
    use crate::app::models::BookLink;
    use std::path::Path;
    use tempfile::TempDir;

    async fn spawn_pool(
        worker_count: usize,
        queue: Arc<LinkQueue>,
        manifest_dir: &Path,
    ) -> (WorkerPool, Arc<ScrapeCounters>) {
        let config = WorkerConfig {
            worker_count,
            destination: manifest_dir.join("books"),
            dry_run: true,
        };
        let client = Arc::new(HarvestClient::with_config(ClientConfig::for_testing()).unwrap());
        let counters = Arc::new(ScrapeCounters::new());
        let manifest = Arc::new(RunManifest::create(manifest_dir).await.unwrap());
        let (events, _rx) = mpsc::channel(256);

        let pool = WorkerPool::spawn(config, queue, client, counters.clone(), manifest, events);
        (pool, counters)
    }

    /// Several workers drain the whole queue between them, each link
    /// processed exactly once
    #[tokio::test]
    async fn test_pool_drains_queue() {
        let temp_dir = TempDir::new().unwrap();
        let queue = Arc::new(LinkQueue::new());
        let links: Vec<BookLink> = (0..12)
            .map(|i| BookLink::new(format!("https://example.org/{}.pdf", i), 1))
            .collect();
        queue.add_links(links).await;

        let (pool, counters) = spawn_pool(3, queue.clone(), temp_dir.path()).await;
        assert_eq!(pool.worker_count(), 3);
        pool.join().await;

        let outcomes = queue.take_outcomes().await;
        assert_eq!(outcomes.len(), 12);

        let mut urls: Vec<String> = outcomes.into_iter().map(|o| o.link.url).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 12);
        assert_eq!(counters.snapshot().downloaded, 12);
    }

    /// A pool over an empty queue joins without hanging
    #[tokio::test]
    async fn test_pool_with_empty_queue() {
        let temp_dir = TempDir::new().unwrap();
        let queue = Arc::new(LinkQueue::new());

        let (pool, counters) = spawn_pool(5, queue.clone(), temp_dir.path()).await;
        pool.join().await;

        assert!(queue.take_outcomes().await.is_empty());
        assert_eq!(counters.snapshot().downloaded, 0);
    }
}
