//! # LargeMsg Storage
//!
//! Backing store trait and object-store adapters for LargeMsg.
//!
//! This crate provides the storage side of payload offloading. Backing
//! stores are **opaque blob stores** - they do not interpret the payloads
//! they hold or the keys they are given.
//!
//! ## Design Principles
//!
//! - Stores are simple blob stores (put, get, delete by prefix)
//! - No knowledge of envelopes, topics or key layout
//! - Must be `Send + Sync`; one instance serves all threads
//! - Failures propagate; stores never retry or fall back
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and in-process pipelines (`mem://`)
//! - [`FileStore`] - Objects as files under a root directory (`file://`)
//! - [`S3Store`] - Amazon S3 over an [`S3Api`] client (`s3://`)
//! - [`AzureBlobStore`] - Azure Blob Storage over a [`BlobServiceApi`]
//!   client (`abs://`)
//!
//! The `aws` feature provides `SdkS3Client` and the `azure` feature
//! provides `SdkBlobClient`, blocking clients over the official SDKs.
//!
//! ## Example
//!
//! ```rust
//! use largemsg_storage::{BackingStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! let address = store.put(b"hello world", "bucket", "greetings/1").unwrap();
//! assert_eq!(address, "mem://bucket/greetings/1");
//! assert_eq!(store.get("bucket", "greetings/1").unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "aws")]
mod aws;
mod azure;
#[cfg(feature = "azure")]
mod azure_sdk;
mod backend;
mod error;
mod file;
mod memory;
mod params;
#[cfg(any(feature = "aws", feature = "azure"))]
mod runtime;
mod s3;

#[cfg(feature = "aws")]
pub use aws::{S3Settings, SdkS3Client};
pub use azure::{AzureBlobStore, BlobServiceApi};
#[cfg(feature = "azure")]
pub use azure_sdk::SdkBlobClient;
pub use backend::{object_address, BackingStore};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use params::ConnectionParams;
pub use s3::{
    DeleteObjectsResponse, ObjectVersion, PutObjectResponse, S3Api, S3Store, MAX_DELETE_BATCH,
};
