//! Error types for the Memory of the World harvester
//!
//! This module defines error types for all components of the application.
//! The split mirrors the control-flow policy: fetch errors are transient and
//! retried by the crawler, download errors are terminal per link, filesystem
//! and configuration errors abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Index page fetch errors
///
/// Every variant is treated as transient by the crawler: the page is retried
/// after a backoff. A successfully fetched page with no links is not an
/// error, it is an empty extraction.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level failure reaching the catalogue
    #[error("Connection failed for page {page}: {message}")]
    Connection { page: u32, message: String },

    /// Page fetch exceeded the configured timeout
    #[error("Page {page} timed out after {seconds} seconds")]
    Timeout { page: u32, seconds: u64 },

    /// Server answered with a non-success status
    #[error("Page {page} returned HTTP {status}")]
    HttpStatus { page: u32, status: u16 },

    /// WebDriver session failure (navigation, source retrieval, or the
    /// session itself). Page is 0 for failures outside any page, such as
    /// the initial connect.
    #[error("Browser session error on page {page}: {message}")]
    Session { page: u32, message: String },
}

/// Download and file-write errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Initial response or a chunk read exceeded the fixed timeout
    #[error("Download timed out after {seconds} seconds: {url}")]
    Timeout { url: String, seconds: u64 },

    /// Server returned error status for a book link
    #[error("Server error: HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    /// Transport failure while requesting or streaming the body
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// I/O error while writing the destination file
    #[error("File I/O error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Destination directory could not be created; nothing can be written
    #[error("Destination directory unavailable: {path}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid worker or client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Audit manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be created at run start
    #[error("Failed to create manifest file {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be appended
    #[error("Failed to append to manifest")]
    Write(#[from] std::io::Error),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read config file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Page fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(_) => true,

            AppError::Download(DownloadError::Timeout { .. })
            | AppError::Download(DownloadError::ServerError { .. })
            | AppError::Download(DownloadError::Transport { .. }) => true,

            AppError::Download(DownloadError::DestinationUnavailable { .. })
            | AppError::Download(DownloadError::Io { .. })
            | AppError::Download(DownloadError::ConfigurationError(_))
            | AppError::Manifest(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Generic { .. } => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::Download(_) => "download",
            AppError::Manifest(_) => "manifest",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Page fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
