//! # LargeMsg Core
//!
//! Transparent offloading of oversized messages to object storage.
//!
//! Producers hand payloads to an [`Encoder`]. Payloads up to the configured
//! `max_size` are sent inline behind a `0x00` flag byte; larger ones are
//! uploaded to the backing store named by the base path and replaced by
//! `0x01` followed by their address. A [`Decoder`] reverses the process,
//! fetching from whichever store the address names.
//!
//! This crate provides:
//! - [`Config`] for thresholds, base path and backend credentials
//! - [`StoreRegistry`] mapping schemes to store constructors
//! - [`StoreFactory`] resolving and caching one client per scheme
//! - Object key naming (`{root}/{topic}/{keys|values}/{uuid}`)
//! - [`Encoder`], [`Decoder`] and the per-topic [`LargeMessageSerde`]
//!
//! ## Example
//!
//! ```rust
//! use largemsg_core::{Config, StoreFactory};
//! use std::sync::Arc;
//!
//! let config = Config::new()
//!     .try_base_path("mem://bucket")
//!     .unwrap()
//!     .max_size(10);
//! let factory = Arc::new(StoreFactory::new(config));
//! let encoder = factory.encoder();
//! let decoder = factory.decoder();
//!
//! assert_eq!(encoder.encode("orders", Some(b"short"), false).unwrap().unwrap(), b"\x00short");
//!
//! let wire = encoder.encode("orders", Some(b"a much longer payload"), false).unwrap();
//! let wire = wire.unwrap();
//! assert_eq!(wire[0], 0x01);
//! assert!(wire[1..].starts_with(b"mem://bucket/orders/values/"));
//! assert_eq!(decoder.decode(Some(&wire)).unwrap().unwrap(), b"a much longer payload");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod decoder;
mod encoder;
mod error;
mod factory;
pub mod naming;
mod registry;
mod serializer;

pub use config::{Config, CustomConfigHook, DEFAULT_MAX_SIZE};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CoreError, CoreResult};
pub use factory::StoreFactory;
pub use naming::RecordRole;
pub use registry::{StoreConstructor, StoreRegistry};
pub use serializer::LargeMessageSerde;

// Re-export the types callers need at the seams.
pub use largemsg_codec::{CodecError, Envelope, Location, BACKED, NOT_BACKED};
pub use largemsg_storage::{BackingStore, ConnectionParams, StorageError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
