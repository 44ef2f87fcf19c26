//! Application constants for the Memory of the World harvester
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Library catalogue URLs and pagination
pub mod catalogue {
    /// Base of the paginated book index; the page number is appended directly
    pub const PAGE_URL_BASE: &str = "https://library.memoryoftheworld.org/#/books?page=";

    /// First page of the catalogue
    pub const START_PAGE: u32 = 1;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Browser user-agent strings; one is picked per client construction
    pub const USER_AGENTS: &[&str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    ];

    /// Timeout for fetching one index page
    pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for the initial download response and for each chunk read
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default request rate against the library hosts (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 10;

    /// Jitter bound applied to rate-limited waits
    pub const RATE_LIMIT_JITTER: Duration = Duration::from_millis(100);
}

/// Link extraction configuration
pub mod extract {
    /// Filename-extension tokens that mark a hyperlink as a downloadable document
    pub const RECOGNIZED_EXTENSIONS: &[&str] = &[
        "pdf", "epub", "mobi", "azw", "azw3", "djvu", "doc", "docx", "rtf", "txt",
        "odt", "fb2", "lit", "lrf", "pdb", "prc", "cbz", "cbr", "chm", "htm",
        "html", "md", "tex", "ps", "zip", "rar", "7z", "tar", "gz",
    ];

    /// CSS selector matching every anchor that carries an href
    pub const ANCHOR_SELECTOR: &str = "a[href]";
}

/// Crawl pacing and retry configuration
pub mod crawler {
    use super::Duration;

    /// Consecutive zero-link attempts on one page before the catalogue is
    /// considered exhausted
    pub const EMPTY_PAGE_ATTEMPTS: u32 = 3;

    /// Pause after a productive page and between empty-page retries
    pub const PAGE_COOLDOWN: Duration = Duration::from_secs(2);

    /// Pause after a connection-level fetch failure before retrying the page
    pub const CONNECTION_BACKOFF: Duration = Duration::from_secs(60);

    /// Extra settle time for script-rendered pages after navigation
    pub const BROWSER_RENDER_WAIT: Duration = Duration::from_millis(500);

    /// Default WebDriver endpoint (ChromeDriver's standard port)
    pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default number of download workers
    pub const DEFAULT_WORKER_COUNT: usize = 5;

    /// Maximum recommended concurrent workers
    pub const MAX_WORKER_COUNT: usize = 64;

    /// Buffer size of the per-worker shutdown channels
    pub const SHUTDOWN_CHANNEL_BUFFER: usize = 1;
}

/// Event sink configuration
pub mod events {
    /// Buffer size of the harvest event channel
    pub const EVENT_CHANNEL_BUFFER: usize = 256;
}

/// File operation constants
pub mod files {
    /// Default destination directory for downloaded books
    pub const DEFAULT_DESTINATION: &str = "books";

    /// Write/flush/fsync granularity when streaming a download to disk (1 MiB)
    pub const DOWNLOAD_CHUNK_SIZE: usize = 1024 * 1024;

    /// Default directory for audit manifest files
    pub const DEFAULT_MANIFEST_DIR: &str = ".";

    /// Audit manifest file name prefix
    pub const MANIFEST_FILE_PREFIX: &str = "harvest-manifest";

    /// Timestamp format embedded in the manifest file name
    pub const MANIFEST_NAME_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

    /// Timestamp format for individual manifest lines
    pub const MANIFEST_LINE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

    /// File name pattern for exported raw page HTML
    pub const HTML_EXPORT_PREFIX: &str = "page";
}

/// Logging and debugging constants
pub mod logging {
    /// Default log level when no verbosity flag is given
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use catalogue::{PAGE_URL_BASE, START_PAGE};
pub use crawler::{CONNECTION_BACKOFF, EMPTY_PAGE_ATTEMPTS, PAGE_COOLDOWN};
pub use extract::RECOGNIZED_EXTENSIONS;
pub use files::{DEFAULT_DESTINATION, DOWNLOAD_CHUNK_SIZE};
pub use http::{DEFAULT_RATE_LIMIT_RPS, DOWNLOAD_TIMEOUT, PAGE_TIMEOUT};
pub use workers::DEFAULT_WORKER_COUNT;
