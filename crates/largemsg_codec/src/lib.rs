//! # LargeMsg Codec
//!
//! Wire envelope and location model for LargeMsg.
//!
//! Every encoded message starts with one flag byte:
//! - `0x00` - the rest of the message is the original payload
//! - `0x01` - the rest is the UTF-8 address of the payload in a backing store
//!
//! Addresses are [`Location`]s of the form `scheme://bucket/path`.
//!
//! ## Usage
//!
//! ```
//! use largemsg_codec::{Envelope, Location};
//!
//! let inline = Envelope::Literal(b"short".to_vec());
//! assert_eq!(inline.to_bytes(), b"\x00short");
//!
//! let loc = Location::parse("s3://bucket/orders/values/1").unwrap();
//! let wire = Envelope::Reference(loc.clone()).to_bytes();
//! assert_eq!(Envelope::from_bytes(&wire).unwrap(), Envelope::Reference(loc));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod error;
mod location;

pub use envelope::{peek_flag, write_envelope, Envelope, BACKED, NOT_BACKED};
pub use error::{CodecError, CodecResult};
pub use location::Location;
