//! Memory of the World Harvester Library
//!
//! A Rust library for collecting books from the Memory of the World online
//! library. Provides a paced catalogue crawler, concurrent downloading with
//! proper rate limiting, and a written audit trail for every run.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        // Test that our constants are accessible
        assert_eq!(DEFAULT_WORKER_COUNT, 5);
        assert_eq!(START_PAGE, 1);
        assert!(PAGE_URL_BASE.contains("memoryoftheworld.org"));
    }

    #[test]
    fn test_error_types() {
        // Test that our error types work correctly
        let fetch_error = errors::FetchError::Timeout {
            page: 3,
            seconds: 30,
        };
        let app_error = AppError::Fetch(fetch_error);

        assert_eq!(app_error.category(), "fetch");
        assert!(app_error.is_recoverable());
    }
}
