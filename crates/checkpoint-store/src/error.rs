//! Checkpoint Store Error Types
//!
//! This module defines all error types that can occur during checkpoint store
//! operations.
//!
//! ## Error Categories
//!
//! - `NotFound`: A record or directory that an operation required was absent,
//!   e.g. a partition entry vanished between directory listing and record read
//! - `CorruptRecord`: A record file exists but its content cannot be parsed
//! - `PermissionDenied`: Filesystem access rights insufficient for read/write
//! - `Unexpected`: Any other underlying I/O failure, surfaced unchanged so the
//!   host can apply its own policy
//!
//! ## Usage
//!
//! All store operations return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows clean error propagation with `?`.
//!
//! Every failure aborts the current ledger-wide operation: one corrupt
//! partition record fails the entire `list_ownership` call for that consumer
//! group. The store never retries; retry policy belongs to the host.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found: {path}")]
    NotFound { path: PathBuf },

    #[error("corrupt record at {path}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("unexpected i/o error at {path}: {source}")]
    Unexpected {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Classify a raw I/O error against the store's taxonomy.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => {
                tracing::error!(
                    path = %path.display(),
                    error = %source,
                    "unexpected i/o failure"
                );
                Error::Unexpected {
                    path: path.to_path_buf(),
                    source,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn classifies_not_found() {
        let err = Error::from_io(
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn classifies_permission_denied() {
        let err = Error::from_io(
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, Error::PermissionDenied { .. }));
    }

    #[test]
    fn other_kinds_are_unexpected() {
        let err = Error::from_io(
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert!(matches!(err, Error::Unexpected { .. }));
    }
}
