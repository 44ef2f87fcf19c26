//! Run counters and the final report
//!
//! This module holds the live counters shared by the crawler and the download
//! workers, and the report assembled from them when a run ends. Counters are
//! plain atomics so any component can update them without locking, and a
//! snapshot taken mid-run (for example at interrupt) is always internally
//! consistent enough to report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live counters updated throughout a run
///
/// Shared as `Arc<ScrapeCounters>` between the crawler (links found) and the
/// download workers (downloads and errors). Updated as work happens, never
/// reconstructed at the end, so an interrupted run still reports accurate
/// totals.
#[derive(Debug, Default)]
pub struct ScrapeCounters {
    links_found: AtomicU64,
    downloaded: AtomicU64,
    errors: AtomicU64,
}

impl ScrapeCounters {
    /// Create counters starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Add newly discovered links to the running total
    pub fn add_found(&self, count: u64) {
        self.links_found.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one completed download (real or planned in dry-run mode)
    pub fn record_download(&self) {
        self.downloaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed download
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> CounterTotals {
        CounterTotals {
            links_found: self.links_found.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTotals {
    /// Book links discovered by the crawler
    pub links_found: u64,
    /// Downloads completed (or planned, in dry-run mode)
    pub downloaded: u64,
    /// Downloads that failed
    pub errors: u64,
}

/// Final report of a run
///
/// Produced on every non-fatal exit path, including interruption. The
/// `interrupted` flag distinguishes a clean finish from a cut-short run with
/// otherwise accurate totals.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Counter totals at the end of the run
    pub totals: CounterTotals,
    /// Catalogue pages visited by the crawler
    pub pages_visited: u32,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Whether the run was interrupted by a shutdown signal
    pub interrupted: bool,
    /// Whether this was a dry run (downloads planned, not performed)
    pub dry_run: bool,
}

impl RunReport {
    /// One-line human summary for the console
    pub fn summary(&self) -> String {
        let header = if self.interrupted {
            "Run interrupted"
        } else {
            "Run complete"
        };
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let verb = if self.dry_run { "planned" } else { "downloaded" };

        format!(
            "{}{}: {} links found across {} pages, {} {}, {} failed in {}",
            header,
            mode,
            self.totals.links_found,
            self.pages_visited,
            self.totals.downloaded,
            verb,
            self.totals.errors,
            format_duration(self.duration),
        )
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Format a duration as human-readable string
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        format!("{}m{}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}h{}m", total_secs / 3600, (total_secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Counters accumulate and snapshot independently
    #[test]
    fn test_counters_accumulate() {
        let counters = ScrapeCounters::new();
        counters.add_found(5);
        counters.add_found(3);
        counters.record_download();
        counters.record_download();
        counters.record_error();

        let totals = counters.snapshot();
        assert_eq!(totals.links_found, 8);
        assert_eq!(totals.downloaded, 2);
        assert_eq!(totals.errors, 1);

        // The snapshot is a copy, not a live view
        counters.record_download();
        assert_eq!(totals.downloaded, 2);
    }

    /// Concurrent updates from many tasks are all counted
    #[tokio::test]
    async fn test_counters_concurrent_updates() {
        let counters = Arc::new(ScrapeCounters::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let counters = counters.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    counters.record_download();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counters.snapshot().downloaded, 1000);
    }

    /// Summary line carries the totals and distinguishes run modes
    #[test]
    fn test_report_summary() {
        let report = RunReport {
            totals: CounterTotals {
                links_found: 120,
                downloaded: 118,
                errors: 2,
            },
            pages_visited: 24,
            started_at: Utc::now(),
            duration: Duration::from_secs(192),
            interrupted: false,
            dry_run: false,
        };

        let summary = report.summary();
        assert!(summary.starts_with("Run complete"));
        assert!(summary.contains("120 links"));
        assert!(summary.contains("118 downloaded"));
        assert!(summary.contains("2 failed"));
        assert!(summary.contains("3m12s"));

        let interrupted = RunReport {
            interrupted: true,
            dry_run: true,
            ..report
        };
        let summary = interrupted.summary();
        assert!(summary.starts_with("Run interrupted"));
        assert!(summary.contains("(dry run)"));
        assert!(summary.contains("planned"));
    }

    /// JSON report carries all fields for machine consumption
    #[test]
    fn test_report_json() {
        let report = RunReport {
            totals: CounterTotals {
                links_found: 1,
                downloaded: 1,
                errors: 0,
            },
            pages_visited: 1,
            started_at: Utc::now(),
            duration: Duration::from_secs(2),
            interrupted: false,
            dry_run: false,
        };

        let json = report.to_json().unwrap();
        assert!(json.contains("\"links_found\": 1"));
        assert!(json.contains("\"pages_visited\": 1"));
        assert!(json.contains("\"interrupted\": false"));
    }

    /// Durations format into the coarsest useful unit
    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h1m");
    }
}
