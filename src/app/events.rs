//! Structured run events
//!
//! Core components never talk to a display or a global progress singleton.
//! Instead each receives an `mpsc::Sender<HarvestEvent>` at construction and
//! emits through it; the CLI owns the receiving end and decides how to
//! render. Emission is non-blocking: a full or closed channel drops the
//! event so a slow consumer can never stall the crawl or a download worker.

use tokio::sync::mpsc;
use tracing::trace;

use crate::app::models::PageIndex;

/// Events emitted by the crawler, the download workers, and the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    /// A page yielded links and the crawl is advancing
    PageCrawled {
        page: PageIndex,
        links_found: usize,
        total_found: u64,
    },
    /// A fetch attempt on a page yielded zero links
    PageEmpty { page: PageIndex, attempt: u32 },
    /// A fetch failed at the connection level and will be retried
    FetchRetry { page: PageIndex, backoff_secs: u64 },
    /// Discovery finished; the download phase can begin
    CrawlFinished {
        pages_visited: u32,
        total_found: u64,
    },
    /// The download phase started with this many links queued
    DownloadStarted { total_links: usize },
    /// Dry run: the file that would have been downloaded
    LinkPlanned { file_name: String },
    /// A file was downloaded and synced to disk
    LinkCompleted {
        worker_id: usize,
        file_name: String,
        bytes_written: u64,
    },
    /// A download failed; the link is recorded and not retried
    LinkFailed {
        worker_id: usize,
        url: String,
        reason: String,
    },
    /// The download phase ended and the totals are final
    DownloadFinished { downloaded: u64, errors: u64 },
}

/// Send an event without blocking, dropping it if the channel is full or the
/// receiver is gone
pub fn emit(sink: &mpsc::Sender<HarvestEvent>, event: HarvestEvent) {
    if let Err(e) = sink.try_send(event) {
        match e {
            mpsc::error::TrySendError::Full(ev) => {
                trace!("event channel full, dropping {:?}", ev);
            }
            mpsc::error::TrySendError::Closed(_) => {
                // Receiver is gone; nothing left to render to.
            }
        }
    }
}
