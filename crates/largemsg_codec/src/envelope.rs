//! The flag-byte wire envelope.
//!
//! ```text
//! +------+---------------------------------------------+
//! | flag | payload                                     |
//! +------+---------------------------------------------+
//!  0x00    literal message bytes
//!  0x01    UTF-8 address `{scheme}://{bucket}/{path}`
//! ```

use crate::error::{CodecError, CodecResult};
use crate::location::Location;
use bytes::{BufMut, BytesMut};

/// Flag byte for a payload carried inline.
pub const NOT_BACKED: u8 = 0x00;

/// Flag byte for a payload stored in a backing store.
pub const BACKED: u8 = 0x01;

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// The message bytes themselves.
    Literal(Vec<u8>),
    /// The address of the stored message.
    Reference(Location),
}

impl Envelope {
    /// Returns `true` if the payload lives in a backing store.
    #[must_use]
    pub fn is_backed(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// The flag byte this envelope is written with.
    #[must_use]
    pub fn flag(&self) -> u8 {
        match self {
            Self::Literal(_) => NOT_BACKED,
            Self::Reference(_) => BACKED,
        }
    }

    /// Writes the envelope as wire bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Literal(data) => write_envelope(NOT_BACKED, data),
            Self::Reference(location) => write_envelope(BACKED, location.to_string().as_bytes()),
        }
    }

    /// Reads an envelope from wire bytes.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidEnvelope`] if the input is empty or the first
    ///   byte is neither [`NOT_BACKED`] nor [`BACKED`]
    /// - [`CodecError::InvalidUtf8`] if a reference is not UTF-8
    /// - [`CodecError::MalformedUri`] if a reference is not a valid address
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        match bytes.split_first() {
            Some((&NOT_BACKED, rest)) => Ok(Self::Literal(rest.to_vec())),
            Some((&BACKED, rest)) => {
                let address = std::str::from_utf8(rest).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Self::Reference(Location::parse(address)?))
            }
            Some((&flag, _)) => Err(CodecError::invalid_envelope(Some(flag))),
            None => Err(CodecError::invalid_envelope(None)),
        }
    }
}

/// Prefixes `payload` with `flag`.
#[must_use]
pub fn write_envelope(flag: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(payload.len() + 1);
    buf.put_u8(flag);
    buf.put_slice(payload);
    buf.to_vec()
}

/// Reads the flag byte of an envelope without decoding the payload.
///
/// # Errors
///
/// Returns [`CodecError::InvalidEnvelope`] for empty input or an unknown
/// flag.
pub fn peek_flag(bytes: &[u8]) -> CodecResult<u8> {
    match bytes.first() {
        Some(&flag) if flag == NOT_BACKED || flag == BACKED => Ok(flag),
        other => Err(CodecError::invalid_envelope(other.copied())),
    }
}
