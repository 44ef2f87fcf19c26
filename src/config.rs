//! Configuration management for the Memory of the World harvester
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.
//! Every section and field in the config file is optional; anything omitted
//! falls back to the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, CrawlerConfig, RunConfig, WorkerConfig};
use crate::constants::{catalogue, crawler, files, http, logging, workers};
use crate::errors::{AppError, ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Catalogue crawl settings
    pub crawler: CrawlerConfigToml,
    /// Download worker settings
    pub workers: WorkerConfigToml,
    /// Destination and manifest paths
    pub files: FilesConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Fixed user-agent string (None = pick a browser agent per run)
    pub user_agent: Option<String>,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Index page fetch timeout in seconds
    pub page_timeout_secs: u64,
    /// Download response and chunk read timeout in seconds
    pub download_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// TCP keep-alive timeout in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            user_agent: None,
            rate_limit_rps: http::DEFAULT_RATE_LIMIT_RPS,
            page_timeout_secs: http::PAGE_TIMEOUT.as_secs(),
            download_timeout_secs: http::DOWNLOAD_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            tcp_keepalive_secs: Some(30),
            tcp_nodelay: true,
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
        }
    }
}

/// TOML-friendly crawler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfigToml {
    /// First catalogue page to fetch
    pub start_page: u32,
    /// Stop after visiting this many pages (None = crawl until exhausted)
    pub page_limit: Option<u32>,
    /// Consecutive empty reads of one page before giving up
    pub empty_page_attempts: u32,
    /// Pause between page fetches in seconds
    pub page_cooldown_secs: u64,
    /// Pause before retrying a failed page fetch in seconds
    pub connection_backoff_secs: u64,
    /// Base URL the page number is appended to
    pub index_url_base: String,
    /// Directory to export fetched page HTML into, if set
    pub html_export_dir: Option<PathBuf>,
}

impl Default for CrawlerConfigToml {
    fn default() -> Self {
        Self {
            start_page: catalogue::START_PAGE,
            page_limit: None,
            empty_page_attempts: crawler::EMPTY_PAGE_ATTEMPTS,
            page_cooldown_secs: crawler::PAGE_COOLDOWN.as_secs(),
            connection_backoff_secs: crawler::CONNECTION_BACKOFF.as_secs(),
            index_url_base: catalogue::PAGE_URL_BASE.to_string(),
            html_export_dir: None,
        }
    }
}

/// TOML-friendly worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfigToml {
    /// Number of concurrent download workers to spawn
    pub worker_count: usize,
}

impl Default for WorkerConfigToml {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_WORKER_COUNT,
        }
    }
}

/// TOML-friendly output path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfigToml {
    /// Directory downloaded books are written into
    pub destination: PathBuf,
    /// Directory the run manifest is created in
    pub manifest_dir: PathBuf,
}

impl Default for FilesConfigToml {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(files::DEFAULT_DESTINATION),
            manifest_dir: PathBuf::from(files::DEFAULT_MANIFEST_DIR),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    ///
    /// `dry_run` is a per-invocation choice and always starts out false here;
    /// the CLI layer flips it from its own flag.
    pub fn to_runtime_config(&self) -> (ClientConfig, RunConfig) {
        let run_config = RunConfig {
            crawler: self.crawler.to_runtime_config(),
            workers: WorkerConfig {
                worker_count: self.workers.worker_count,
                destination: self.files.destination.clone(),
                dry_run: false,
            },
            manifest_dir: self.files.manifest_dir.clone(),
        };

        (self.client.to_runtime_config(), run_config)
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. CLI arguments (applied by the caller)
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        // Try to load from config file
        let config_path = if let Some(ref path) = config_file_override {
            // Use explicit config file
            Some(path.clone())
        } else {
            // Look for default config file locations
            Self::find_config_file()
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(AppError::generic(format!(
                    "Specified config file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(config)
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file if none exists and notifies the user
    pub async fn initialize_first_run() -> Result<Option<PathBuf>> {
        let config_path = Self::get_default_config_path()?;

        if config_path.exists() {
            // Config already exists, nothing to do
            return Ok(Some(config_path));
        }

        info!("Creating default configuration file...");

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let config_content = Self::generate_default_config_content();

        tokio::fs::write(&config_path, config_content)
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

        // Notify user
        println!("📁 Created default configuration file:");
        println!("   {}", config_path.display());
        println!("   You can customize settings by editing this file.");
        println!();

        Ok(Some(config_path))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            // Project-local config
            PathBuf::from("./motw-harvester.toml"),
        ];

        // User config
        if let Ok(path) = Self::get_default_config_path() {
            search_paths.push(path);
        }

        // System config (Unix only)
        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/motw-harvester/config.toml"));

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    fn get_default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::generic("Could not determine user config directory"))?;

        Ok(config_dir.join("motw-harvester").join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::from)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# Memory of the World harvester configuration
# This file was automatically generated on first run.
# Every setting is optional; anything removed falls back to the default.

[client]
# Fixed user-agent string (unset = pick a browser agent per run)
# user_agent = "Mozilla/5.0 ..."
rate_limit_rps = {}
page_timeout_secs = {}
download_timeout_secs = {}
connect_timeout_secs = {}
tcp_keepalive_secs = 30
tcp_nodelay = true
pool_idle_timeout_secs = {}
pool_max_per_host = {}

[crawler]
start_page = {}
# Stop after this many catalogue pages (unset = crawl until exhausted)
# page_limit = 50
empty_page_attempts = {}
page_cooldown_secs = {}
connection_backoff_secs = {}
index_url_base = "{}"
# Keep a copy of each fetched catalogue page
# html_export_dir = "./pages"

[workers]
worker_count = {}

[files]
destination = "{}"
manifest_dir = "{}"

[logging]
level = "{}"  # error, warn, info, debug, trace
"#,
            http::DEFAULT_RATE_LIMIT_RPS,
            http::PAGE_TIMEOUT.as_secs(),
            http::DOWNLOAD_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            http::POOL_IDLE_TIMEOUT.as_secs(),
            http::POOL_MAX_PER_HOST,
            catalogue::START_PAGE,
            crawler::EMPTY_PAGE_ATTEMPTS,
            crawler::PAGE_COOLDOWN.as_secs(),
            crawler::CONNECTION_BACKOFF.as_secs(),
            catalogue::PAGE_URL_BASE,
            workers::DEFAULT_WORKER_COUNT,
            files::DEFAULT_DESTINATION,
            files::DEFAULT_MANIFEST_DIR,
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        // The runtime default picks the rotating user agent
        let mut config = ClientConfig::default();

        if let Some(ref agent) = self.user_agent {
            config.user_agent = agent.clone();
        }
        config.rate_limit_rps = self.rate_limit_rps;
        config.page_timeout = Duration::from_secs(self.page_timeout_secs);
        config.download_timeout = Duration::from_secs(self.download_timeout_secs);
        config.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        config.tcp_keepalive = self.tcp_keepalive_secs.map(Duration::from_secs);
        config.tcp_nodelay = self.tcp_nodelay;
        config.pool_idle_timeout = self.pool_idle_timeout_secs.map(Duration::from_secs);
        config.pool_max_per_host = self.pool_max_per_host;

        config
    }
}

impl CrawlerConfigToml {
    /// Convert to runtime CrawlerConfig
    pub fn to_runtime_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            start_page: self.start_page,
            page_limit: self.page_limit,
            empty_page_attempts: self.empty_page_attempts,
            page_cooldown: Duration::from_secs(self.page_cooldown_secs),
            connection_backoff: Duration::from_secs(self.connection_backoff_secs),
            index_url_base: self.index_url_base.clone(),
            html_export_dir: self.html_export_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_config_creation() {
        let config = AppConfig::default();

        // Verify defaults are reasonable
        assert_eq!(config.workers.worker_count, workers::DEFAULT_WORKER_COUNT);
        assert_eq!(config.client.rate_limit_rps, http::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.logging.level, logging::DEFAULT_LOG_LEVEL);
        assert_eq!(config.crawler.start_page, catalogue::START_PAGE);
        assert!(config.crawler.page_limit.is_none());
    }

    #[tokio::test]
    async fn test_config_file_generation() {
        let content = AppConfig::generate_default_config_content();

        // Should be valid TOML
        let parsed: AppConfig = toml::from_str(&content).unwrap();

        // Should have sensible defaults
        assert_eq!(parsed.workers.worker_count, workers::DEFAULT_WORKER_COUNT);
        assert_eq!(
            parsed.crawler.empty_page_attempts,
            crawler::EMPTY_PAGE_ATTEMPTS
        );
        assert!(content.contains("# Memory of the World harvester configuration"));
        assert!(content.contains("[crawler]"));
        assert!(content.contains("[files]"));
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        // Should fail when explicitly specified
        let result = AppConfig::load(Some(config_path)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_loading_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        // A partial config only overrides what it names
        let test_config = r#"
[crawler]
start_page = 3
page_limit = 12

[workers]
worker_count = 8

[logging]
level = "debug"
"#;

        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();

        // Verify custom values were loaded
        assert_eq!(config.crawler.start_page, 3);
        assert_eq!(config.crawler.page_limit, Some(12));
        assert_eq!(config.workers.worker_count, 8);
        assert_eq!(config.logging.level, "debug");

        // Verify defaults are still present for unspecified values
        assert_eq!(config.client.rate_limit_rps, http::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(
            config.files.destination,
            PathBuf::from(files::DEFAULT_DESTINATION)
        );
    }

    #[tokio::test]
    async fn test_config_loading_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");

        tokio::fs::write(&config_path, "[crawler\nstart_page = 3")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_runtime_conversion() {
        let mut config = AppConfig::default();
        config.crawler.page_cooldown_secs = 7;
        config.files.destination = PathBuf::from("/tmp/books");

        let (client_config, run_config) = config.to_runtime_config();

        assert_eq!(run_config.crawler.page_cooldown, Duration::from_secs(7));
        assert_eq!(run_config.workers.destination, PathBuf::from("/tmp/books"));
        assert!(!run_config.workers.dry_run);
        assert!(!client_config.user_agent.is_empty());
    }

    #[test]
    fn test_fixed_user_agent_wins() {
        let mut config = ClientConfigToml::default();
        config.user_agent = Some("test-agent/1.0".to_string());

        let runtime = config.to_runtime_config();
        assert_eq!(runtime.user_agent, "test-agent/1.0");
    }
}
