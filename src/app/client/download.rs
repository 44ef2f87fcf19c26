//! Streaming file downloads with durable chunked writes
//!
//! A download streams the response body straight to the destination path in
//! fixed 1 MiB chunks. Every chunk is written, flushed, and fsync'd before
//! more of the body is consumed, bounding memory use and guaranteeing that
//! whatever the file contains at any instant has reached the disk. A failed
//! stream removes its partial file best-effort; the failure itself is what
//! keeps the link from being counted as downloaded.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::app::client::http::HttpHandler;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
    chunk_size: usize,
    timeout: Duration,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler borrowing the shared HTTP handler
    pub fn new(http_handler: &'a HttpHandler, chunk_size: usize, timeout: Duration) -> Self {
        Self {
            http_handler,
            chunk_size,
            timeout,
        }
    }

    /// Download a URL to the destination path, returning bytes written
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails, the server answers with
    /// a non-success status, a chunk read times out, or a write fails. On
    /// any of these the partial destination file is removed best-effort.
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        match self.download_attempt(url, destination).await {
            Ok(bytes_written) => {
                debug!(
                    "downloaded {} ({} bytes)",
                    destination.display(),
                    bytes_written
                );
                Ok(bytes_written)
            }
            Err(e) => {
                if tokio::fs::remove_file(destination).await.is_ok() {
                    warn!("removed partial file {}", destination.display());
                }
                Err(e)
            }
        }
    }

    async fn download_attempt(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        let response = self.http_handler.get_response(url, self.timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| io_error(destination, e))?;

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut written = 0u64;

        loop {
            let next = match tokio::time::timeout(self.timeout, stream.next()).await {
                Err(_) => {
                    return Err(DownloadError::Timeout {
                        url: url.to_string(),
                        seconds: self.timeout.as_secs(),
                    })
                }
                Ok(next) => next,
            };

            match next {
                None => break,
                Some(Err(e)) => {
                    return Err(DownloadError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    while buffer.len() >= self.chunk_size {
                        let rest = buffer.split_off(self.chunk_size);
                        self.write_chunk(&mut file, &buffer, destination).await?;
                        written += buffer.len() as u64;
                        buffer = rest;
                    }
                }
            }
        }

        if !buffer.is_empty() {
            self.write_chunk(&mut file, &buffer, destination).await?;
            written += buffer.len() as u64;
        }

        Ok(written)
    }

    /// Write one chunk and make it durable before returning
    async fn write_chunk(
        &self,
        file: &mut File,
        bytes: &[u8],
        destination: &Path,
    ) -> DownloadResult<()> {
        file.write_all(bytes)
            .await
            .map_err(|e| io_error(destination, e))?;
        file.flush().await.map_err(|e| io_error(destination, e))?;
        file.sync_data()
            .await
            .map_err(|e| io_error(destination, e))?;
        Ok(())
    }
}

fn io_error(destination: &Path, error: std::io::Error) -> DownloadError {
    DownloadError::Io {
        path: destination.to_path_buf(),
        message: error.to_string(),
    }
}
