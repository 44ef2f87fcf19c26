//! Command-line interface components
//!
//! This module contains CLI-specific code for the Memory of the World
//! harvester, including argument parsing, progress display, and command
//! handlers.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, CrawlArgs, GlobalArgs, RunArgs};
pub use commands::{handle_crawl, handle_run};
pub use progress::{ProgressConfig, ProgressDisplay};
