//! Audit manifest for harvest runs
//!
//! Every run appends a plain-text record of what it discovered, downloaded,
//! planned, or failed, one timestamped line per event. The manifest is the
//! durable audit trail of a run: creating it must succeed before any work
//! starts, but a failed append only logs a warning because losing one audit
//! line is never worth abandoning downloads in flight.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::constants::files;
use crate::errors::{ManifestError, ManifestResult};

/// Append-only manifest file for one run
///
/// The file is named `harvest-manifest-<timestamp>.txt` and lives in the
/// configured manifest directory. Shared as `Arc<RunManifest>` between the
/// crawler and the download workers; appends are serialized through an async
/// mutex so concurrent workers never interleave partial lines.
pub struct RunManifest {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunManifest {
    /// Create the manifest file for a new run
    ///
    /// # Arguments
    ///
    /// * `manifest_dir` - Directory the manifest file is created in
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Create` if the file cannot be created. This
    /// is fatal to the run: a harvest that cannot be audited is not started.
    pub async fn create(manifest_dir: &Path) -> ManifestResult<Self> {
        let stamp = Utc::now().format(files::MANIFEST_NAME_TIMESTAMP);
        let name = format!("{}-{}.txt", files::MANIFEST_FILE_PREFIX, stamp);
        let path = manifest_dir.join(name);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| ManifestError::Create {
                path: path.clone(),
                source,
            })?;

        info!("manifest file created at {}", path.display());

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Record a discovered book link
    pub async fn record_discovered(&self, url: &str) {
        self.append(&format!("discovered {}", url)).await;
    }

    /// Record a completed download
    pub async fn record_downloaded(&self, file_name: &str, bytes: u64) {
        self.append(&format!("downloaded {} {}", file_name, bytes))
            .await;
    }

    /// Record a failed download
    pub async fn record_failed(&self, url: &str, reason: &str) {
        self.append(&format!("failed {} {}", url, reason)).await;
    }

    /// Record a download that a dry run would have performed
    pub async fn record_planned(&self, file_name: &str) {
        self.append(&format!("planned {}", file_name)).await;
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line, logging instead of failing
    async fn append(&self, entry: &str) {
        if let Err(e) = self.try_append(entry).await {
            warn!("manifest append failed: {}", e);
        }
    }

    async fn try_append(&self, entry: &str) -> ManifestResult<()> {
        let stamp = Utc::now().format(files::MANIFEST_LINE_TIMESTAMP);
        let line = format!("{} {}\n", stamp, entry);

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl std::fmt::Debug for RunManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunManifest")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn read_lines(manifest: &RunManifest) -> Vec<String> {
        let content = tokio::fs::read_to_string(manifest.path()).await.unwrap();
        content.lines().map(String::from).collect()
    }

    /// Manifest file is created inside the given directory with the
    /// expected name shape
    #[tokio::test]
    async fn test_manifest_creation() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = RunManifest::create(temp_dir.path()).await.unwrap();

        let name = manifest
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("harvest-manifest-"));
        assert!(name.ends_with(".txt"));
        assert!(manifest.path().exists());
    }

    /// Creation fails when the directory does not exist
    #[tokio::test]
    async fn test_manifest_creation_fails_without_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir");

        let result = RunManifest::create(&missing).await;
        assert!(matches!(result, Err(ManifestError::Create { .. })));
    }

    /// Each record becomes one timestamped line in the order written
    #[tokio::test]
    async fn test_manifest_records_lines_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = RunManifest::create(temp_dir.path()).await.unwrap();

        manifest
            .record_discovered("https://example.org/b/Some%20Book.pdf")
            .await;
        manifest.record_downloaded("Some Book.pdf", 1024).await;
        manifest
            .record_failed("https://example.org/b/Other.epub", "HTTP 503")
            .await;
        manifest.record_planned("Third.djvu").await;

        let lines = read_lines(&manifest).await;
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("discovered https://example.org/b/Some%20Book.pdf"));
        assert!(lines[1].contains("downloaded Some Book.pdf 1024"));
        assert!(lines[2].contains("failed https://example.org/b/Other.epub HTTP 503"));
        assert!(lines[3].contains("planned Third.djvu"));

        // Every line starts with a UTC timestamp
        for line in &lines {
            assert!(line.ends_with('Z') || line.contains("Z "));
            let stamp = line.split(' ').next().unwrap();
            assert!(stamp.ends_with('Z'));
            assert!(stamp.contains('T'));
        }
    }

    /// Concurrent appends never interleave partial lines
    #[tokio::test]
    async fn test_manifest_concurrent_appends() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = std::sync::Arc::new(RunManifest::create(temp_dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let manifest = manifest.clone();
            handles.push(tokio::spawn(async move {
                for j in 0..10 {
                    manifest
                        .record_downloaded(&format!("book-{}-{}.pdf", i, j), 1)
                        .await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let lines = read_lines(&manifest).await;
        assert_eq!(lines.len(), 80);
        for line in lines {
            assert!(line.contains("downloaded book-"));
        }
    }
}
