//! Shared work queue for the download phase
//!
//! The crawler produces a fixed, ordered batch of book links; the download
//! workers drain it. The queue is a mutex-guarded FIFO plus an outcome log:
//! workers claim the next pending link, process it, and record the result.
//! When `claim_next` returns `None` the queue is empty for good (the crawl
//! has already finished), so workers treat it as the signal to exit.

use std::collections::VecDeque;

use tokio::sync::Mutex;
use tracing::debug;

use crate::app::models::{BookLink, LinkOutcome};

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<BookLink>,
    outcomes: Vec<LinkOutcome>,
    total_enqueued: usize,
}

/// FIFO queue of book links shared by the download workers
#[derive(Debug, Default)]
pub struct LinkQueue {
    state: Mutex<QueueState>,
}

impl LinkQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a batch of links in their discovery order
    pub async fn add_links(&self, links: impl IntoIterator<Item = BookLink>) {
        let mut state = self.state.lock().await;
        let before = state.pending.len();
        state.pending.extend(links);
        state.total_enqueued += state.pending.len() - before;
        debug!("queued {} links", state.pending.len() - before);
    }

    /// Claim the next pending link, or `None` when the queue is drained
    pub async fn claim_next(&self) -> Option<BookLink> {
        let mut state = self.state.lock().await;
        state.pending.pop_front()
    }

    /// Record the outcome of a processed link
    pub async fn record_outcome(&self, outcome: LinkOutcome) {
        let mut state = self.state.lock().await;
        state.outcomes.push(outcome);
    }

    /// Number of links still waiting to be claimed
    pub async fn pending_count(&self) -> usize {
        let state = self.state.lock().await;
        state.pending.len()
    }

    /// Number of links ever enqueued
    pub async fn total_enqueued(&self) -> usize {
        let state = self.state.lock().await;
        state.total_enqueued
    }

    /// Take all recorded outcomes, leaving the log empty
    pub async fn take_outcomes(&self) -> Vec<LinkOutcome> {
        let mut state = self.state.lock().await;
        std::mem::take(&mut state.outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::FetchOutcome;

    fn link(url: &str) -> BookLink {
        BookLink::new(url, 1)
    }

    /// Links come back out in the order they went in
    #[tokio::test]
    async fn test_queue_is_fifo() {
        let queue = LinkQueue::new();
        queue
            .add_links(vec![
                link("https://example.org/a.pdf"),
                link("https://example.org/b.pdf"),
                link("https://example.org/c.pdf"),
            ])
            .await;

        assert_eq!(queue.total_enqueued().await, 3);
        assert_eq!(queue.pending_count().await, 3);

        let first = queue.claim_next().await.unwrap();
        assert_eq!(first.url, "https://example.org/a.pdf");
        let second = queue.claim_next().await.unwrap();
        assert_eq!(second.url, "https://example.org/b.pdf");
        let third = queue.claim_next().await.unwrap();
        assert_eq!(third.url, "https://example.org/c.pdf");

        assert!(queue.claim_next().await.is_none());
        assert_eq!(queue.total_enqueued().await, 3);
    }

    /// Outcomes accumulate and take_outcomes drains the log
    #[tokio::test]
    async fn test_outcome_recording() {
        let queue = LinkQueue::new();
        queue
            .record_outcome(LinkOutcome {
                link: link("https://example.org/a.pdf"),
                outcome: FetchOutcome::Success { bytes_written: 10 },
            })
            .await;
        queue
            .record_outcome(LinkOutcome {
                link: link("https://example.org/b.pdf"),
                outcome: FetchOutcome::Failure {
                    reason: "HTTP 500".to_string(),
                },
            })
            .await;

        let outcomes = queue.take_outcomes().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].outcome.is_success());
        assert!(!outcomes[1].outcome.is_success());

        assert!(queue.take_outcomes().await.is_empty());
    }

    /// Concurrent claimers each get a distinct link and drain the queue
    #[tokio::test]
    async fn test_concurrent_claims_are_disjoint() {
        let queue = std::sync::Arc::new(LinkQueue::new());
        let links: Vec<BookLink> = (0..50)
            .map(|i| link(&format!("https://example.org/{}.pdf", i)))
            .collect();
        queue.add_links(links).await;

        let mut handles = Vec::new();
        for _ in 0..5 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut claimed = Vec::new();
                while let Some(link) = queue.claim_next().await {
                    claimed.push(link.url);
                }
                claimed
            }));
        }

        let mut all: Vec<String> = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50);
        assert_eq!(queue.pending_count().await, 0);
    }
}
