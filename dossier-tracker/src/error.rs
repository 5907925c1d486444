//! Error types for the tracker

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that cross the tracker boundary
///
/// Poll failures never show up here: they are logged and retried by the
/// poller. Only launch failures propagate to the caller.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The job creation request failed; no job is tracked for it
    #[error("Failed to launch job: {0:#}")]
    Launch(#[source] anyhow::Error),

    /// The server answered a creation request with an unusable job
    #[error("Server returned an invalid job: {0}")]
    InvalidJob(String),
}

/// Errors raised by snapshot storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backing medium
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}
