//! Command-line argument parsing for the Memory of the World harvester
//!
//! This module defines the CLI structure using clap derive macros,
//! providing a user-friendly interface for crawling the catalogue and
//! downloading books.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::crawler;

/// motw-harvester - collect books from the Memory of the World library
#[derive(Parser, Debug)]
#[command(
    name = "motw-harvester",
    version,
    about = "Harvest books from the Memory of the World online library",
    long_about = "A polite harvester for the Memory of the World online library.
Walks the catalogue page by page, collects every book link, and downloads the
files concurrently with rate limiting and a written audit trail."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the catalogue and download every book found
    Run(RunArgs),

    /// Crawl the catalogue and list book links without downloading
    Crawl(CrawlArgs),
}

/// Arguments for the run command
///
/// Flags left unset fall back to the config file, then to the built-in
/// defaults.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory downloaded books are written into
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Number of concurrent download workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// First catalogue page to fetch
    #[arg(long, value_name = "N")]
    pub start_page: Option<u32>,

    /// Stop after crawling this many catalogue pages
    #[arg(short, long, value_name = "N")]
    pub pages: Option<u32>,

    /// Dry run - crawl and plan downloads without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Drop the crawl pacing delays (page cooldown and error backoff)
    #[arg(long)]
    pub fast: bool,

    /// Fetch catalogue pages through a WebDriver browser session
    #[arg(long)]
    pub browser: bool,

    /// WebDriver endpoint used with --browser
    #[arg(long, value_name = "URL", default_value = crawler::DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Override the catalogue base URL the page number is appended to
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Keep a copy of each fetched catalogue page in this directory
    #[arg(long, value_name = "DIR")]
    pub export_html: Option<PathBuf>,

    /// Directory the run manifest is created in
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Write the final run report as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Arguments for the crawl command
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// First catalogue page to fetch
    #[arg(long, value_name = "N")]
    pub start_page: Option<u32>,

    /// Stop after crawling this many catalogue pages
    #[arg(short, long, value_name = "N")]
    pub pages: Option<u32>,

    /// Drop the crawl pacing delays (page cooldown and error backoff)
    #[arg(long)]
    pub fast: bool,

    /// Fetch catalogue pages through a WebDriver browser session
    #[arg(long)]
    pub browser: bool,

    /// WebDriver endpoint used with --browser
    #[arg(long, value_name = "URL", default_value = crawler::DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Override the catalogue base URL the page number is appended to
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Keep a copy of each fetched catalogue page in this directory
    #[arg(long, value_name = "DIR")]
    pub export_html: Option<PathBuf>,

    /// Directory the run manifest is created in
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// Returns `None` when no verbosity flag was given so the config file
    /// default can apply.
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl RunArgs {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Number of workers must be greater than 0".to_string());
            }
        }

        if let Some(pages) = self.pages {
            if pages == 0 {
                return Err("Page limit must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}
