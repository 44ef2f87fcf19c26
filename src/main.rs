//! Memory of the World harvester CLI application
//!
//! Command-line interface for collecting books from the Memory of the World
//! online library. Crawls the catalogue politely, downloads concurrently,
//! and leaves a written audit trail of everything it did.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use motw_harvester::cli::{handle_crawl, handle_run, Cli, Commands};
use motw_harvester::config::AppConfig;
use motw_harvester::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Create the default config file on the very first run, unless an
    // explicit one was given
    if cli.global.config.is_none() && !cli.global.quiet {
        AppConfig::initialize_first_run().await?;
    }

    let app_config = AppConfig::load(cli.global.config.clone()).await?;

    // Initialize logging based on verbosity, falling back to the config file
    init_logging(&cli, &app_config);

    info!("motw-harvester v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => {
            info!("Executing run command");
            handle_run(args, &cli.global, app_config).await
        }
        Commands::Crawl(args) => {
            info!("Executing crawl command");
            handle_crawl(args, &cli.global, app_config).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = match cli.log_level() {
        Some(level) => level.to_string().to_lowercase(),
        None => config.logging.level.clone(),
    };

    // The level may come from the config file, so a bad value falls back
    // instead of panicking
    let filter = match format!("motw_harvester={}", log_level).parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => {
            eprintln!("Invalid log level '{}', falling back to warn", log_level);
            EnvFilter::new("motw_harvester=warn")
        }
    };

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
