use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
}

impl DownloadEntry {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sha1: None,
        }
    }

    pub fn with_sha1(mut self, sha1: Option<String>) -> Self {
        self.sha1 = sha1;
        self
    }
}

/// Anything that can bring a batch of files onto disk. Returns the entries
/// that failed, each with its error; an empty list means success.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch_all(&self, entries: Vec<DownloadEntry>) -> Vec<(DownloadEntry, LauncherError)>;
}

/// Concurrent, SHA-1 validated downloader.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    // ── Single file download ────────────────────────────

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// Creates parent directories as needed. Drops the file handle
    /// immediately after writing to avoid Windows OS Error 5.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        // Validate SHA-1 before writing (compute on the in-memory buffer)
        if let Some(expected) = sha1_expected {
            let actual = sha1_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LauncherError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
            // file is dropped here — critical on Windows
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, bytes.len());
        Ok(())
    }

    // ── Batch concurrent downloads ──────────────────────

    /// Download many files concurrently using `buffer_unordered`.
    ///
    /// Returns the list of files that failed (if any).
    pub async fn download_batch(
        &self,
        entries: Vec<DownloadEntry>,
    ) -> Vec<(DownloadEntry, LauncherError)> {
        info!(
            "Starting batch download: {} files, concurrency={}",
            entries.len(),
            self.concurrency
        );

        let results: Vec<_> = stream::iter(entries)
            .map(|entry| async move {
                let result = self
                    .download_file(&entry.url, &entry.dest, entry.sha1.as_deref())
                    .await;
                (entry, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(entry, result)| result.err().map(|e| (entry, e)))
            .collect()
    }

    /// Validate an existing file's SHA-1.
    pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<bool> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Ok(sha1_hex(&bytes).eq_ignore_ascii_case(expected))
    }
}

#[async_trait]
impl ArtifactFetcher for Downloader {
    async fn fetch_all(&self, entries: Vec<DownloadEntry>) -> Vec<(DownloadEntry, LauncherError)> {
        self.download_batch(entries).await
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
