//! Catalogue crawler
//!
//! Walks the library index page by page, extracts book links from each page,
//! and stops when the catalogue runs out or a configured page limit is hit.
//! The crawl is deliberately sequential and slow: one page at a time, a
//! cooldown between fetches, and a long backoff when the connection drops.
//! Fetch errors never kill the crawl; the same page is retried until it
//! loads. Only repeated empty pages end it.
//!
//! The crawler is infallible by construction: `crawl` always returns a
//! report with whatever was discovered, and live counters are updated as
//! links are found so an interrupted crawl still reports accurate totals.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::coordinator::stats::ScrapeCounters;
use crate::app::events::{emit, HarvestEvent};
use crate::app::extract::LinkExtractor;
use crate::app::manifest::RunManifest;
use crate::app::models::{BookLink, PageIndex};
use crate::constants::files;

pub mod browser;
pub mod config;
pub mod fetcher;

pub use browser::BrowserPageFetcher;
pub use config::CrawlerConfig;
pub use fetcher::{HttpPageFetcher, PageFetcher};

/// What a finished (or interrupted) crawl discovered
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Book links in discovery order
    pub links: Vec<BookLink>,
    /// Distinct catalogue pages fetched at least once
    pub pages_visited: u32,
}

/// Sequential catalogue crawler
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    extractor: LinkExtractor,
    config: CrawlerConfig,
    counters: Arc<ScrapeCounters>,
    manifest: Arc<RunManifest>,
    events: mpsc::Sender<HarvestEvent>,
}

impl Crawler {
    /// Create a crawler over the given page source
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: LinkExtractor,
        config: CrawlerConfig,
        counters: Arc<ScrapeCounters>,
        manifest: Arc<RunManifest>,
        events: mpsc::Sender<HarvestEvent>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            counters,
            manifest,
            events,
        }
    }

    /// Walk the catalogue until it is exhausted or the page limit is hit
    ///
    /// Fetch errors are retried on the same page after the connection
    /// backoff, without limit. A page that yields zero links is re-read
    /// until the configured number of consecutive empty attempts is
    /// reached, at which point the catalogue is considered exhausted even
    /// if a page limit would have allowed more pages.
    pub async fn crawl(&self) -> CrawlReport {
        let mut links: Vec<BookLink> = Vec::new();
        let mut page = self.config.start_page;
        let mut pages_visited: u32 = 0;
        let mut empty_attempts: u32 = 0;

        info!(
            "starting crawl at page {} via {} fetcher",
            page,
            self.fetcher.describe()
        );

        if let Some(dir) = &self.config.html_export_dir {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                warn!("cannot create HTML export dir {}: {}", dir.display(), e);
            }
        }

        loop {
            let html = match self.fetcher.fetch_page(page).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(
                        "page {} fetch failed, retrying in {}s: {}",
                        page,
                        self.config.connection_backoff.as_secs(),
                        e
                    );
                    emit(
                        &self.events,
                        HarvestEvent::FetchRetry {
                            page,
                            backoff_secs: self.config.connection_backoff.as_secs(),
                        },
                    );
                    tokio::time::sleep(self.config.connection_backoff).await;
                    continue;
                }
            };

            // Empty attempts stay on the same page, so only the first
            // successful fetch of a page counts as a visit
            if empty_attempts == 0 {
                pages_visited += 1;
            }

            if let Some(dir) = &self.config.html_export_dir {
                self.export_html(dir, page, &html).await;
            }

            let found = self.extractor.extract(&html);

            if found.is_empty() {
                empty_attempts += 1;
                debug!(
                    "page {} empty (attempt {}/{})",
                    page, empty_attempts, self.config.empty_page_attempts
                );
                emit(
                    &self.events,
                    HarvestEvent::PageEmpty {
                        page,
                        attempt: empty_attempts,
                    },
                );

                if empty_attempts >= self.config.empty_page_attempts {
                    info!(
                        "catalogue exhausted: page {} empty {} times",
                        page, empty_attempts
                    );
                    break;
                }

                tokio::time::sleep(self.config.page_cooldown).await;
                continue;
            }

            empty_attempts = 0;
            let found_count = found.len();
            self.counters.add_found(found_count as u64);
            for url in &found {
                self.manifest.record_discovered(url).await;
            }

            debug!("page {} yielded {} links", page, found_count);
            links.extend(found.into_iter().map(|url| BookLink::new(url, page)));
            emit(
                &self.events,
                HarvestEvent::PageCrawled {
                    page,
                    links_found: found_count,
                    total_found: links.len() as u64,
                },
            );

            if let Some(limit) = self.config.page_limit {
                if pages_visited >= limit {
                    info!("page limit of {} reached", limit);
                    break;
                }
            }

            tokio::time::sleep(self.config.page_cooldown).await;
            page += 1;
        }

        emit(
            &self.events,
            HarvestEvent::CrawlFinished {
                pages_visited,
                total_found: links.len() as u64,
            },
        );
        info!(
            "crawl finished: {} links across {} pages",
            links.len(),
            pages_visited
        );

        CrawlReport {
            links,
            pages_visited,
        }
    }

    /// Write fetched page HTML for offline inspection; failures only warn
    async fn export_html(&self, dir: &std::path::Path, page: PageIndex, html: &str) {
        let name = format!("{}-{:04}.html", files::HTML_EXPORT_PREFIX, page);
        let path = dir.join(name);
        if let Err(e) = tokio::fs::write(&path, html).await {
            warn!("HTML export to {} failed: {}", path.display(), e);
        }
    }
}
