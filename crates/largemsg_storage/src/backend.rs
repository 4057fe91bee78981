//! Backing store trait definition.

use crate::error::StorageResult;

/// An object store that holds offloaded message payloads.
///
/// Backing stores are **opaque blob stores**. They write, read and bulk
/// delete whole objects addressed by bucket and key; they know nothing
/// about envelopes, topics or key layout.
///
/// # Invariants
///
/// - `put` returns the fully qualified address `{scheme}://{bucket}/{key}`
/// - `get` returns the entire object body, never a partial read
/// - `delete_all_objects` with an empty prefix covers the whole bucket
/// - Backends must be `Send + Sync`; one instance serves concurrent
///   callers
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing and embedding
/// - [`super::FileStore`] - Objects as files on a local file system
/// - [`super::S3Store`] - Amazon S3 and S3-compatible services
/// - [`super::AzureBlobStore`] - Azure Blob Storage
pub trait BackingStore: Send + Sync {
    /// The scheme used in the addresses this store returns, e.g. `s3`.
    fn scheme(&self) -> &str;

    /// Writes `data` under `key` in `bucket`.
    ///
    /// Returns the address of the stored object.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::UploadFailed`] if the backend
    /// answers with a non-success status, or another error if it cannot be
    /// reached.
    fn put(&self, data: &[u8], bucket: &str, key: &str) -> StorageResult<String>;

    /// Reads the full object stored under `key` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::ObjectNotFound`] if there is no such
    /// object, or [`crate::StorageError::BackendUnavailable`] if the
    /// backend cannot serve the request.
    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Deletes every object (and every stored version) in `bucket` whose key
    /// starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or any object cannot be deleted.
    fn delete_all_objects(&self, bucket: &str, prefix: &str) -> StorageResult<()>;
}

/// Formats the address of an object as returned by [`BackingStore::put`].
#[must_use]
pub fn object_address(scheme: &str, bucket: &str, key: &str) -> String {
    format!("{scheme}://{bucket}/{key}")
}
