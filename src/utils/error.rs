//! The `error` module defines the error type returned by every store operation.
//!
//! "Not found" is never represented here: collection reads return an empty
//! sequence and the server info read returns a zero value instead.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The handle was never opened or has already been closed.
    #[error("store is not open")]
    Unavailable,

    #[error("timed out after {waited:?} waiting for exclusive lock on {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("failed to open store at {}: {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: sled::Error,
    },

    #[error("persistence failure: {0}")]
    Persist(#[from] sled::Error),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the failure happened while acquiring exclusive access at open time.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            StoreError::LockTimeout { .. } | StoreError::OpenFailure { .. }
        )
    }
}
