//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during backing store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend answered a write with a non-success status.
    #[error("upload failed with status {status}: {response}")]
    UploadFailed {
        /// Status code reported by the backend.
        status: u16,
        /// Raw backend response, for diagnostics.
        response: String,
    },

    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound {
        /// Bucket or container searched.
        bucket: String,
        /// Object key.
        key: String,
    },

    /// The backend could not be reached or failed the request.
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        /// Description of the failure.
        message: String,
    },

    /// Some objects of a bulk delete were not removed.
    #[error("failed to delete {failed} object(s): {message}")]
    DeleteFailed {
        /// Number of objects the backend refused to delete.
        failed: usize,
        /// First error reported by the backend.
        message: String,
    },

    /// The object key cannot be stored by this backend.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A required connection parameter was not supplied.
    #[error("missing connection parameter: {name}")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// A connection parameter was supplied but cannot be used.
    #[error("invalid connection parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl StorageError {
    /// Create a backend unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    /// Create an object not found error.
    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error means the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}
