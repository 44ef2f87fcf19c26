//! Real-time progress display for harvest runs
//!
//! This module renders the event stream emitted by the crawl and download
//! phases using indicatif. The crawl shows up as a spinner line that follows
//! the page walk; once the download phase starts it gains an overall bar plus
//! one status line per worker. When stderr is not a terminal the display
//! falls back to occasional plain-text progress lines, and in quiet mode it
//! silently drains the event stream so the emitting side never backs up.
//!
//! # Examples
//!
//! ```rust,no_run
//! use motw_harvester::cli::{ProgressConfig, ProgressDisplay};
//! use motw_harvester::constants::events;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (events_tx, events_rx) = mpsc::channel(events::EVENT_CHANNEL_BUFFER);
//!
//! let mut display = ProgressDisplay::new(ProgressConfig::default());
//! display.start(events_rx, 5)?;
//!
//! // ... run the harvest with events_tx, then drop it ...
//! drop(events_tx);
//!
//! display.finish().await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::terminal;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::events::HarvestEvent;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable visual progress bars (false = drain events silently)
    pub enable_progress_bars: bool,
    /// Show one status line per download worker
    pub show_worker_details: bool,
    /// Maximum width for file names in display
    pub max_filename_width: usize,
    /// How often text mode prints a progress line
    pub report_interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bars: true,
            show_worker_details: true,
            max_filename_width: 40,
            report_interval: Duration::from_secs(10),
        }
    }
}

/// Main progress display manager
///
/// Owns the render task that consumes the harvest event stream. The task
/// ends when every event sender has been dropped, so `finish` must be called
/// after the run is over.
pub struct ProgressDisplay {
    config: ProgressConfig,
    render_task: Option<JoinHandle<()>>,
    is_terminal: bool,
}

impl ProgressDisplay {
    /// Create a new progress display with the given configuration
    pub fn new(config: ProgressConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);

        Self {
            config,
            render_task: None,
            is_terminal,
        }
    }

    /// Start rendering the event stream
    ///
    /// # Arguments
    ///
    /// * `events` - Receiving end of the harvest event channel
    /// * `worker_count` - Number of download workers that will be active
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if a progress bar template fails to parse
    pub fn start(
        &mut self,
        events: mpsc::Receiver<HarvestEvent>,
        worker_count: usize,
    ) -> DownloadResult<()> {
        if !self.config.enable_progress_bars {
            self.render_task = Some(tokio::spawn(drain_events(events)));
            return Ok(());
        }

        if !self.is_terminal {
            // Fallback to simple text progress
            let interval = self.config.report_interval;
            self.render_task = Some(tokio::spawn(render_text(events, interval)));
            return Ok(());
        }

        let multi = MultiProgress::new();

        // Crawl status line; the download bars are added once the crawl is
        // done and the totals are known
        let crawl_bar = multi.add(ProgressBar::new_spinner());
        crawl_bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .map_err(|e| {
                    DownloadError::ConfigurationError(format!("progress template: {}", e))
                })?
                .tick_strings(&["◐", "◓", "◑", "◒"]),
        );
        crawl_bar.set_message("Starting crawl...");
        crawl_bar.enable_steady_tick(Duration::from_millis(120));

        let main_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map_err(|e| DownloadError::ConfigurationError(format!("progress template: {}", e)))?
            .progress_chars("##-");

        let worker_style = ProgressStyle::default_spinner()
            .template("  Worker {prefix}: {spinner:.blue} {msg}")
            .map_err(|e| DownloadError::ConfigurationError(format!("progress template: {}", e)))?;

        let name_width = effective_filename_width(self.config.max_filename_width);
        let show_workers = self.config.show_worker_details;

        self.render_task = Some(tokio::spawn(render_bars(
            events,
            multi,
            crawl_bar,
            main_style,
            worker_style,
            worker_count,
            show_workers,
            name_width,
        )));

        debug!("progress display started for {} workers", worker_count);
        Ok(())
    }

    /// Wait for the render task to drain the event stream and clean up
    ///
    /// The task only ends once every event sender is dropped, so the run
    /// must be complete before calling this.
    pub async fn finish(&mut self) {
        if let Some(task) = self.render_task.take() {
            if let Err(e) = task.await {
                warn!("progress render task failed: {}", e);
            }
        }
    }
}

/// Quiet mode: consume events so the emitting side never sees a full channel
async fn drain_events(mut events: mpsc::Receiver<HarvestEvent>) {
    while events.recv().await.is_some() {}
}

/// Text-mode rendering for non-terminal environments
async fn render_text(mut events: mpsc::Receiver<HarvestEvent>, report_interval: Duration) {
    let mut last_report = Instant::now();
    let mut total_links = 0usize;
    let mut settled = 0u64;

    while let Some(event) = events.recv().await {
        match event {
            HarvestEvent::PageCrawled {
                page, total_found, ..
            } => {
                if last_report.elapsed() >= report_interval {
                    eprintln!("Crawling: page {}, {} links found", page, total_found);
                    last_report = Instant::now();
                }
            }
            HarvestEvent::FetchRetry { page, backoff_secs } => {
                eprintln!(
                    "Connection error on page {}, retrying in {}s",
                    page, backoff_secs
                );
            }
            HarvestEvent::CrawlFinished {
                pages_visited,
                total_found,
            } => {
                eprintln!(
                    "Crawl complete: {} links across {} pages",
                    total_found, pages_visited
                );
            }
            HarvestEvent::DownloadStarted { total_links: total } => {
                total_links = total;
                last_report = Instant::now();
                eprintln!("Downloading {} books...", total);
            }
            HarvestEvent::LinkPlanned { .. } | HarvestEvent::LinkCompleted { .. } => {
                settled += 1;
                if last_report.elapsed() >= report_interval {
                    eprintln!("Progress: {}/{} books", settled, total_links);
                    last_report = Instant::now();
                }
            }
            HarvestEvent::LinkFailed { url, reason, .. } => {
                settled += 1;
                eprintln!("Failed: {} ({})", url, reason);
            }
            HarvestEvent::DownloadFinished { downloaded, errors } => {
                eprintln!(
                    "Download finished: {} completed, {} failed",
                    downloaded, errors
                );
            }
            HarvestEvent::PageEmpty { .. } => {}
        }
    }
}

/// Full indicatif rendering for interactive terminals
#[allow(clippy::too_many_arguments)]
async fn render_bars(
    mut events: mpsc::Receiver<HarvestEvent>,
    multi: MultiProgress,
    crawl_bar: ProgressBar,
    main_style: ProgressStyle,
    worker_style: ProgressStyle,
    worker_count: usize,
    show_workers: bool,
    name_width: usize,
) {
    let mut main_bar: Option<ProgressBar> = None;
    let mut worker_bars: HashMap<usize, ProgressBar> = HashMap::new();

    while let Some(event) = events.recv().await {
        match event {
            HarvestEvent::PageCrawled {
                page,
                links_found,
                total_found,
            } => {
                crawl_bar.set_message(format!(
                    "Crawling page {}: {} links ({} total)",
                    page, links_found, total_found
                ));
            }

            HarvestEvent::PageEmpty { page, attempt } => {
                crawl_bar.set_message(format!("Page {} empty (attempt {})", page, attempt));
            }

            HarvestEvent::FetchRetry { page, backoff_secs } => {
                crawl_bar.set_message(format!(
                    "Connection error on page {}, retrying in {}s",
                    page, backoff_secs
                ));
            }

            HarvestEvent::CrawlFinished {
                pages_visited,
                total_found,
            } => {
                crawl_bar.finish_with_message(format!(
                    "Crawl complete: {} links across {} pages",
                    total_found, pages_visited
                ));
            }

            HarvestEvent::DownloadStarted { total_links } => {
                let bar = multi.add(ProgressBar::new(total_links as u64));
                bar.set_style(main_style.clone());
                bar.set_message("Downloading books");
                bar.enable_steady_tick(Duration::from_millis(120));

                if show_workers {
                    for id in 0..worker_count {
                        let worker_bar = multi.add(ProgressBar::new_spinner());
                        worker_bar.set_style(worker_style.clone());
                        worker_bar.set_prefix(format!("{}", id + 1));
                        worker_bar.set_message("waiting for work");
                        worker_bars.insert(id, worker_bar);
                    }
                }

                main_bar = Some(bar);
            }

            HarvestEvent::LinkPlanned { file_name } => {
                if let Some(bar) = &main_bar {
                    bar.inc(1);
                    bar.set_message(format!("planned {}", truncate_name(&file_name, name_width)));
                }
            }

            HarvestEvent::LinkCompleted {
                worker_id,
                file_name,
                bytes_written,
            } => {
                if let Some(bar) = &main_bar {
                    bar.inc(1);
                }
                if let Some(worker_bar) = worker_bars.get(&worker_id) {
                    worker_bar.set_message(format!(
                        "✅ {} ({} bytes)",
                        truncate_name(&file_name, name_width),
                        bytes_written
                    ));
                }
            }

            HarvestEvent::LinkFailed {
                worker_id,
                url,
                reason,
            } => {
                if let Some(bar) = &main_bar {
                    bar.inc(1);
                }
                if let Some(worker_bar) = worker_bars.get(&worker_id) {
                    worker_bar.set_message(format!(
                        "❌ {} ({})",
                        truncate_name(&url, name_width),
                        reason
                    ));
                }
            }

            HarvestEvent::DownloadFinished { downloaded, errors } => {
                for worker_bar in worker_bars.values() {
                    worker_bar.finish_and_clear();
                }
                if let Some(bar) = &main_bar {
                    bar.finish_with_message(format!(
                        "✅ {} downloaded, {} failed",
                        downloaded, errors
                    ));
                }
            }
        }
    }

    // Channel closed with bars still live means the run was cut short
    if !crawl_bar.is_finished() {
        crawl_bar.finish_and_clear();
    }
    for worker_bar in worker_bars.values() {
        worker_bar.finish_and_clear();
    }
    if let Some(bar) = &main_bar {
        if !bar.is_finished() {
            bar.abandon_with_message("interrupted");
        }
    }
}

/// Cap the configured file name width on narrow terminals
fn effective_filename_width(configured: usize) -> usize {
    match terminal::size() {
        Ok((cols, _)) if (cols as usize) < 100 => configured.min((cols as usize) / 3),
        _ => configured,
    }
}

/// Shorten a name to `width` characters, keeping the tail
fn truncate_name(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width {
        return name.to_string();
    }

    // Keep the end of the name; extensions matter more than prefixes
    let keep = width.saturating_sub(3);
    let tail: String = name.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
