//! Error type for a scan.
//!
//! Walk errors come straight from the traversal and abort it. Open and read
//! errors come from hashing tasks and travel through the error latch. Panics
//! inside a task are caught and treated like task failures.

use std::any::Any;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of a [`ScanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Listing a directory (or resolving an entry) failed.
    Walk,
    /// A file could not be opened for reading.
    Open,
    /// Reading a file's bytes failed part way.
    Read,
    /// A hashing task panicked or a background task could not be joined.
    Panic,
}

/// Failure of a whole scan. Exactly one of these is surfaced per failed run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("hashing task for '{}' panicked: {message}", path.display())]
    TaskPanicked { path: PathBuf, message: String },

    #[error("background task failed: {message}")]
    Join { message: String },
}

impl ScanError {
    /// Wrap a traversal error. `fallback` is used when walkdir has no path
    /// to attach (it always has one in practice).
    pub(crate) fn walk(source: walkdir::Error, fallback: &Path) -> Self {
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf());
        ScanError::Walk { path, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Walk { .. } => ErrorKind::Walk,
            ScanError::Open { .. } => ErrorKind::Open,
            ScanError::Read { .. } => ErrorKind::Read,
            ScanError::TaskPanicked { .. } | ScanError::Join { .. } => ErrorKind::Panic,
        }
    }

    /// The path the failure is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanError::Walk { path, .. }
            | ScanError::Open { path, .. }
            | ScanError::Read { path, .. }
            | ScanError::TaskPanicked { path, .. } => Some(path),
            ScanError::Join { .. } => None,
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl From<tokio::task::JoinError> for ScanError {
    fn from(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            panic_message(&*err.into_panic())
        } else {
            err.to_string()
        };
        ScanError::Join { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_path_and_cause() {
        let err = ScanError::Open {
            path: PathBuf::from("/data/missing.bin"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/missing.bin"));
        assert!(msg.contains("No such file or directory"));
        assert_eq!(err.kind(), ErrorKind::Open);
        assert_eq!(err.path(), Some(Path::new("/data/missing.bin")));
    }

    #[test]
    fn join_failure_has_no_path() {
        let err = ScanError::Join {
            message: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Panic);
        assert!(err.path().is_none());
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*s), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*owned), "owned");
        let other: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(&*other), "unknown panic payload");
    }
}
