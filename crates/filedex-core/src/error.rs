//! Warning and error types.
//!
//! Per-entry problems during a crawl never abort the crawl; they are
//! collected as [`CrawlWarning`] values and logged. Only watch setup
//! failures are fatal to a root's watcher/coordinator pair, surfaced
//! as [`WatchError`] from `Supervisor::start`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of crawl warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Error reading file or directory metadata.
    MetadataError,
    /// Error reading file contents while hashing.
    ReadError,
    /// Error listing a directory's children.
    ListError,
    /// Path was neither a file nor a directory.
    Unresolved,
}

/// Non-fatal problem encountered while crawling a single entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl CrawlWarning {
    /// Create a new crawl warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for a metadata (stat) failure.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("stat failed: {error}"), WarningKind::MetadataError)
    }

    /// Warning for a content read failure during hashing.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("read failed: {error}"), WarningKind::ReadError)
    }

    /// Warning for a directory listing failure.
    pub fn list_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("list failed: {error}"), WarningKind::ListError)
    }

    /// Warning for a path that resolved to neither file nor directory.
    pub fn unresolved(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("neither file nor directory: {}", path.display()),
            path,
            kind: WarningKind::Unresolved,
        }
    }
}

/// Errors fatal to a root's watcher/coordinator pair.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The OS change-notification handle could not be set up.
    #[error("failed to set up watch on {path}: {message}")]
    Setup { path: PathBuf, message: String },

    /// The root path is not a directory.
    #[error("root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The root is already being watched.
    #[error("root is already watched: {path}")]
    AlreadyWatched { path: PathBuf },

    /// I/O error while registering a root.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WatchError {
    /// Create a setup error with path context.
    pub fn setup(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Setup {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_constructors() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = CrawlWarning::read_error("/test/path", &err);
        assert_eq!(warning.kind, WarningKind::ReadError);
        assert!(warning.message.contains("denied"));

        let warning = CrawlWarning::unresolved("/test/other");
        assert_eq!(warning.kind, WarningKind::Unresolved);
    }

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::AlreadyWatched {
            path: PathBuf::from("/data"),
        };
        assert!(err.to_string().contains("/data"));
    }
}
