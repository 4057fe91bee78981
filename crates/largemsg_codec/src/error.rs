//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while parsing locations or decoding envelopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The address string could not be parsed as a URI.
    #[error("malformed URI {uri:?}: {reason}")]
    MalformedUri {
        /// The offending input.
        uri: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The first byte of an envelope is neither sentinel.
    #[error("message can only be marked as backed or non-backed (flag: {})", display_flag(.flag))]
    InvalidEnvelope {
        /// The flag byte found, or `None` for a zero-length envelope.
        flag: Option<u8>,
    },

    /// A reference envelope did not carry a UTF-8 address.
    #[error("backed message address is not valid UTF-8")]
    InvalidUtf8,
}

fn display_flag(flag: &Option<u8>) -> String {
    match flag {
        Some(b) => format!("{b:#04x}"),
        None => "missing".to_string(),
    }
}

impl CodecError {
    /// Create a malformed URI error.
    pub fn malformed_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid envelope error for the given leading byte.
    pub fn invalid_envelope(flag: Option<u8>) -> Self {
        Self::InvalidEnvelope { flag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_envelope_message_names_flag() {
        let err = CodecError::invalid_envelope(Some(2));
        let msg = err.to_string();
        assert!(msg.contains("backed or non-backed"));
        assert!(msg.contains("0x02"));
    }

    #[test]
    fn invalid_envelope_message_for_empty_input() {
        let err = CodecError::invalid_envelope(None);
        assert!(err.to_string().contains("missing"));
    }
}
