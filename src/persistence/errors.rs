//! Persistence error types

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure reading or writing a snapshot file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A snapshot file exists but is not valid structured data
    #[error("Malformed snapshot file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl PersistenceError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        PersistenceError::Malformed {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PersistenceError::Io { .. } => "ROWBASE_PERSIST_IO",
            PersistenceError::Malformed { .. } => "ROWBASE_SNAPSHOT_MALFORMED",
        }
    }

    /// A malformed snapshot stops the process from serving
    pub fn is_fatal(&self) -> bool {
        matches!(self, PersistenceError::Malformed { .. })
    }
}
