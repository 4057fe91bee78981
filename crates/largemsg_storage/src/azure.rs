//! Azure Blob Storage backing store.

use crate::backend::{object_address, BackingStore};
use crate::error::{StorageError, StorageResult};
use std::sync::Arc;
use tracing::info;

/// The subset of the Blob service API the store needs.
///
/// `SdkBlobClient` (feature `azure`) implements it over the Azure SDK;
/// tests substitute in-memory fakes. Buckets map to containers and keys to
/// blob names.
pub trait BlobServiceApi: Send + Sync {
    /// Uploads a block blob, replacing any existing blob of that name.
    fn upload_blob(&self, container: &str, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Downloads the entire blob.
    fn download_blob(&self, container: &str, name: &str) -> StorageResult<Vec<u8>>;

    /// Lists the names of all blobs starting with `prefix`.
    fn list_blobs(&self, container: &str, prefix: &str) -> StorageResult<Vec<String>>;

    /// Deletes one blob.
    fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()>;
}

/// Backing store for Azure Blob Storage.
///
/// The Blob service has no multi-object delete in its basic API, so
/// [`BackingStore::delete_all_objects`] deletes listed blobs one by one.
#[derive(Clone)]
pub struct AzureBlobStore {
    service: Arc<dyn BlobServiceApi>,
}

impl AzureBlobStore {
    /// The scheme of addresses produced by this store.
    pub const SCHEME: &'static str = "abs";

    /// Connection parameter carrying the storage account connection string.
    pub const CONNECTION_STRING_PARAM: &'static str = "conn_str";

    /// Creates a store over a blob service client.
    pub fn new(service: Arc<dyn BlobServiceApi>) -> Self {
        Self { service }
    }
}

impl BackingStore for AzureBlobStore {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    fn put(&self, data: &[u8], bucket: &str, key: &str) -> StorageResult<String> {
        self.service.upload_blob(bucket, key, data)?;
        Ok(object_address(Self::SCHEME, bucket, key))
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.service.download_blob(bucket, key)
    }

    fn delete_all_objects(&self, bucket: &str, prefix: &str) -> StorageResult<()> {
        let names = self.service.list_blobs(bucket, prefix)?;
        let mut deleted = 0usize;
        let mut failed = 0usize;
        let mut first_error = None;
        for name in &names {
            match self.service.delete_blob(bucket, name) {
                Ok(()) => deleted += 1,
                // Deleted by someone else since listing.
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    failed += 1;
                    first_error.get_or_insert_with(|| format!("{name}: {e}"));
                }
            }
        }
        info!(bucket, prefix, deleted, failed, "deleted blobs from Azure");
        match first_error {
            Some(message) => Err(StorageError::DeleteFailed { failed, message }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AzureBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobStore").finish_non_exhaustive()
    }
}
