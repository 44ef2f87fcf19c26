//! Download phase configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{files, workers};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the download worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent workers to spawn
    pub worker_count: usize,
    /// Directory downloaded files are written into
    pub destination: PathBuf,
    /// Plan downloads without performing them
    pub dry_run: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_WORKER_COUNT,
            destination: PathBuf::from(files::DEFAULT_DESTINATION),
            dry_run: false,
        }
    }
}

impl WorkerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> DownloadResult<()> {
        if self.worker_count == 0 {
            return Err(DownloadError::ConfigurationError(
                "Worker count cannot be zero".to_string(),
            ));
        }

        if self.worker_count > workers::MAX_WORKER_COUNT {
            return Err(DownloadError::ConfigurationError(format!(
                "Worker count ({}) exceeds maximum ({})",
                self.worker_count,
                workers::MAX_WORKER_COUNT
            )));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(DownloadError::ConfigurationError(
                "Destination directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults match the documented constants
    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.worker_count, workers::DEFAULT_WORKER_COUNT);
        assert_eq!(config.destination, PathBuf::from(files::DEFAULT_DESTINATION));
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    /// Validation rejects worker counts that cannot work
    #[test]
    fn test_config_validation() {
        let config = WorkerConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkerConfig {
            worker_count: workers::MAX_WORKER_COUNT + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkerConfig {
            destination: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
