mod client;

pub use client::{ArtifactFetcher, DownloadEntry, Downloader};
