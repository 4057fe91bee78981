//! Error types for LargeMsg core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Envelope or address decoding error.
    #[error("codec error: {0}")]
    Codec(#[from] largemsg_codec::CodecError),

    /// Backing store error.
    #[error("storage error: {0}")]
    Storage(#[from] largemsg_storage::StorageError),

    /// No backing store is registered for a scheme.
    #[error("the scheme {scheme} is not supported")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
    },

    /// A message needs backing but no base path is configured.
    #[error("base path must not be null")]
    MissingBasePath,
}

impl CoreError {
    /// Returns `true` if the error is an unrecognized envelope flag.
    #[must_use]
    pub fn is_invalid_envelope(&self) -> bool {
        matches!(
            self,
            Self::Codec(largemsg_codec::CodecError::InvalidEnvelope { .. })
        )
    }

    /// Returns `true` if the error is a missing object in the backing store.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }
}
