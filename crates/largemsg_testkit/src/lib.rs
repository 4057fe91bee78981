//! # LargeMsg Testkit
//!
//! Test utilities for LargeMsg.
//!
//! This crate provides:
//! - Fixtures: test configurations and a bundle of stores for every scheme
//! - Property-based test generators using proptest
//! - In-memory mocks of the S3 and Azure Blob service APIs
//!
//! Cross-crate integration tests live in this crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust
//! use largemsg_testkit::prelude::*;
//!
//! let stores = TestStores::new();
//! let factory = stores.factory(config_for("s3://bucket", 4));
//! let wire = factory.encoder().encode("orders", Some(b"offloaded"), false).unwrap();
//! assert_eq!(stores.s3.put_calls(), 1);
//! assert_eq!(
//!     factory.decoder().decode(wire.as_deref()).unwrap().as_deref(),
//!     Some(&b"offloaded"[..])
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::mocks::*;
}

pub use fixtures::*;
pub use generators::*;
pub use mocks::*;
