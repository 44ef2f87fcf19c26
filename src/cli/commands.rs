//! Command handlers for the Memory of the World harvester CLI
//!
//! This module implements the main command handlers that coordinate between
//! CLI arguments and the core application functionality. Flags merge over
//! the config file, which merges over the built-in defaults.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::app::coordinator::{create_shutdown_channel, spawn_signal_listener};
use crate::app::crawler::{BrowserPageFetcher, HttpPageFetcher, PageFetcher};
use crate::app::{HarvestClient, RunConfig, RunCoordinator, RunReport};
use crate::cli::{CrawlArgs, GlobalArgs, ProgressConfig, ProgressDisplay, RunArgs};
use crate::config::AppConfig;
use crate::constants::events;
use crate::errors::{AppError, Result};

/// Handle the run command
///
/// Crawls the catalogue, then downloads everything discovered. Prints a
/// summary block at the end and optionally writes the report as JSON.
pub async fn handle_run(args: RunArgs, global: &GlobalArgs, app_config: AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    // Merge CLI flags over the config file
    let (client_config, mut run_config) = app_config.to_runtime_config();
    apply_run_args(&mut run_config, &args);

    info!(
        "Starting run with {} workers into {}",
        run_config.workers.worker_count,
        run_config.workers.destination.display()
    );

    let client = Arc::new(HarvestClient::with_config(client_config)?);
    let fetcher = build_fetcher(
        args.browser,
        &args.webdriver_url,
        client.clone(),
        &run_config.crawler.index_url_base,
    )
    .await?;

    // Shutdown plumbing; the listener turns CTRL-C into a broadcast
    let (shutdown_tx, _shutdown_rx) = create_shutdown_channel();
    let _signal_task = spawn_signal_listener(shutdown_tx.clone());

    // Event stream feeding the progress display
    let (events_tx, events_rx) = mpsc::channel(events::EVENT_CHANNEL_BUFFER);
    let mut progress = ProgressDisplay::new(ProgressConfig {
        enable_progress_bars: !global.quiet,
        show_worker_details: global.verbose || global.very_verbose,
        ..Default::default()
    });
    progress.start(events_rx, run_config.workers.worker_count)?;

    if run_config.workers.dry_run && !global.quiet {
        println!("🔍 Dry run - planning downloads without writing files");
    }

    let coordinator = RunCoordinator::new(run_config, fetcher, client, events_tx, shutdown_tx);
    let result = coordinator.execute().await;

    // Dropping the coordinator closes the event stream and ends the display
    drop(coordinator);
    progress.finish().await;

    let report = result?;
    print_run_summary(&report, global.quiet);

    if let Some(path) = &args.report {
        write_report_file(&report, path).await?;
        if !global.quiet {
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

/// Handle the crawl command
///
/// Crawls the catalogue and prints every discovered book link to stdout,
/// one URL per line. Progress goes to stderr so the link list stays clean.
pub async fn handle_crawl(
    args: CrawlArgs,
    global: &GlobalArgs,
    app_config: AppConfig,
) -> Result<()> {
    let (client_config, mut run_config) = app_config.to_runtime_config();
    apply_crawl_args(&mut run_config, &args);

    info!(
        "Starting crawl from page {}",
        run_config.crawler.start_page
    );

    let client = Arc::new(HarvestClient::with_config(client_config)?);
    let fetcher = build_fetcher(
        args.browser,
        &args.webdriver_url,
        client.clone(),
        &run_config.crawler.index_url_base,
    )
    .await?;

    let (shutdown_tx, _shutdown_rx) = create_shutdown_channel();
    let _signal_task = spawn_signal_listener(shutdown_tx.clone());

    let (events_tx, events_rx) = mpsc::channel(events::EVENT_CHANNEL_BUFFER);
    let mut progress = ProgressDisplay::new(ProgressConfig {
        enable_progress_bars: !global.quiet,
        show_worker_details: false,
        ..Default::default()
    });
    progress.start(events_rx, 0)?;

    let coordinator = RunCoordinator::new(run_config, fetcher, client, events_tx, shutdown_tx);
    let result = coordinator.crawl_once().await;

    drop(coordinator);
    progress.finish().await;

    let report = result?;
    for link in &report.links {
        println!("{}", link.url);
    }

    if !global.quiet {
        eprintln!(
            "📊 Found {} links across {} pages",
            report.links.len(),
            report.pages_visited
        );
    }

    Ok(())
}

/// Overlay run command flags onto the merged configuration
fn apply_run_args(config: &mut RunConfig, args: &RunArgs) {
    if let Some(destination) = &args.destination {
        config.workers.destination = destination.clone();
    }
    if let Some(workers) = args.workers {
        config.workers.worker_count = workers;
    }
    if let Some(start_page) = args.start_page {
        config.crawler.start_page = start_page;
    }
    if let Some(pages) = args.pages {
        config.crawler.page_limit = Some(pages);
    }
    if let Some(index_url) = &args.index_url {
        config.crawler.index_url_base = index_url.clone();
    }
    if let Some(export_dir) = &args.export_html {
        config.crawler.html_export_dir = Some(export_dir.clone());
    }
    if let Some(manifest_dir) = &args.manifest_dir {
        config.manifest_dir = manifest_dir.clone();
    }

    config.workers.dry_run = args.dry_run;
    if args.fast {
        *config = config.clone().fast();
    }
}

/// Overlay crawl command flags onto the merged configuration
fn apply_crawl_args(config: &mut RunConfig, args: &CrawlArgs) {
    if let Some(start_page) = args.start_page {
        config.crawler.start_page = start_page;
    }
    if let Some(pages) = args.pages {
        config.crawler.page_limit = Some(pages);
    }
    if let Some(index_url) = &args.index_url {
        config.crawler.index_url_base = index_url.clone();
    }
    if let Some(export_dir) = &args.export_html {
        config.crawler.html_export_dir = Some(export_dir.clone());
    }
    if let Some(manifest_dir) = &args.manifest_dir {
        config.manifest_dir = manifest_dir.clone();
    }

    if args.fast {
        *config = config.clone().fast();
    }
}

/// Build the page fetcher the crawl will use
///
/// Plain HTTP by default; a WebDriver session when --browser is given. The
/// browser path fails fast if the WebDriver endpoint is unreachable.
async fn build_fetcher(
    browser: bool,
    webdriver_url: &str,
    client: Arc<HarvestClient>,
    index_url_base: &str,
) -> Result<Arc<dyn PageFetcher>> {
    if browser {
        info!("connecting to WebDriver at {}", webdriver_url);
        let fetcher = BrowserPageFetcher::connect(webdriver_url, index_url_base).await?;
        Ok(Arc::new(fetcher))
    } else {
        Ok(Arc::new(HttpPageFetcher::new(client, index_url_base)))
    }
}

/// Print the end-of-run summary block
fn print_run_summary(report: &RunReport, quiet: bool) {
    if quiet {
        println!("{}", report.summary());
        return;
    }

    let totals = report.totals;
    let done_label = if report.dry_run {
        "Planned"
    } else {
        "Downloaded"
    };

    println!();
    println!("📊 Harvest Summary:");
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Links found: {}", totals.links_found);
    println!("  {}: {}", done_label, totals.downloaded);
    println!("  Failed: {}", totals.errors);
    println!("  Total time: {:?}", report.duration);

    if report.interrupted {
        println!("  ⚠️  Interrupted - totals cover the work done before the signal");
    }
}

/// Write the run report as pretty JSON
async fn write_report_file(report: &RunReport, path: &Path) -> Result<()> {
    let json = report
        .to_json()
        .map_err(|e| AppError::generic(format!("Failed to serialize report: {}", e)))?;

    tokio::fs::write(path, json).await.map_err(|e| {
        AppError::generic(format!(
            "Failed to write report {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}
