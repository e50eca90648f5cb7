use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Failed to download the following files:\n{}", .0.join("\n"))]
    DownloadsFailed(Vec<String>),

    #[error("Some libraries marked as 'local' are missing their jar files:\n{}", .0.join("\n"))]
    LocalLibrariesMissing(Vec<String>),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Profile resolution ──────────────────────────────
    #[error("Version is incomplete: required component {0} is missing")]
    VersionIncomplete(String),

    #[error("Patch {path:?} is invalid: {reason}")]
    PatchParse { path: PathBuf, reason: String },

    #[error("Load id {expected} does not match internal id {found}")]
    PatchIdMismatch { expected: String, found: String },

    #[error("{first} has the same order ({order}) as {second}")]
    OrderCollision {
        first: String,
        second: String,
        order: i32,
    },

    #[error("Patch {0} was loaded more than once")]
    DuplicatePatch(String),

    #[error("Patch {patch} requires Minecraft {required}, but the profile uses {actual}")]
    VersionMismatch {
        patch: String,
        required: String,
        actual: String,
    },

    #[error("Profile has unapplied changes; reload or reapply it first")]
    ProfileStale,

    #[error("No order number is left above {0}")]
    OrderExhausted(i32),

    #[error("Cannot move patch #{index}: {reason}")]
    InvalidMove { index: usize, reason: String },

    // ── Instance ────────────────────────────────────────
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Instance already exists: {0}")]
    InstanceAlreadyExists(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn patch_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LauncherError::PatchParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the profile could not be resolved at all.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            LauncherError::VersionIncomplete(_)
                | LauncherError::PatchParse { .. }
                | LauncherError::PatchIdMismatch { .. }
                | LauncherError::OrderCollision { .. }
                | LauncherError::DuplicatePatch(_)
                | LauncherError::VersionMismatch { .. }
        )
    }
}
