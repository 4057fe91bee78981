//! Amazon S3 backing store.

use crate::backend::{object_address, BackingStore};
use crate::error::{StorageError, StorageResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Most keys a single `DeleteObjects` request accepts.
pub const MAX_DELETE_BATCH: usize = 1000;

/// Response to a `PutObject` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectResponse {
    /// HTTP status code returned by the service.
    pub status: u16,
    /// Raw response, kept for error reporting.
    pub raw: String,
}

impl PutObjectResponse {
    /// A successful (`200 OK`) response.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            raw: String::new(),
        }
    }
}

/// One stored version of an object, as returned by `ListObjectVersions`.
///
/// Delete markers are listed as versions too; removing them is part of
/// clearing a prefix on a versioned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersion {
    /// Object key.
    pub key: String,
    /// Version id, `None` for unversioned objects.
    pub version_id: Option<String>,
}

/// Outcome of a `DeleteObjects` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectsResponse {
    /// Keys the service refused to delete, with its error message.
    pub errors: Vec<(String, String)>,
}

/// The subset of the S3 API the store needs.
///
/// Implement this trait to plug in an S3 client. With the `aws` feature
/// enabled, [`crate::SdkS3Client`] implements it on top of `aws-sdk-s3`.
pub trait S3Api: Send + Sync {
    /// Uploads an object.
    ///
    /// A reachable service that rejects the upload should be reported as a
    /// response with a non-200 status rather than an error.
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<PutObjectResponse>;

    /// Downloads the entire body of an object.
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Lists every version and delete marker under `prefix`, following
    /// pagination to the end.
    fn list_object_versions(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectVersion>>;

    /// Deletes up to [`MAX_DELETE_BATCH`] object versions in one request.
    fn delete_objects(
        &self,
        bucket: &str,
        objects: &[ObjectVersion],
    ) -> StorageResult<DeleteObjectsResponse>;
}

/// Backing store for Amazon S3 and S3-compatible services.
///
/// # Thread Safety
///
/// Shares one [`S3Api`] client between all callers; the client is required
/// to be safe for concurrent requests.
#[derive(Clone)]
pub struct S3Store {
    client: Arc<dyn S3Api>,
}

impl S3Store {
    /// The scheme of addresses produced by this store.
    pub const SCHEME: &'static str = "s3";

    /// Creates a store over an S3 client.
    pub fn new(client: Arc<dyn S3Api>) -> Self {
        Self { client }
    }
}

impl BackingStore for S3Store {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    fn put(&self, data: &[u8], bucket: &str, key: &str) -> StorageResult<String> {
        let response = self.client.put_object(bucket, key, data)?;
        if response.status != 200 {
            return Err(StorageError::UploadFailed {
                status: response.status,
                response: response.raw,
            });
        }
        Ok(object_address(Self::SCHEME, bucket, key))
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.client.get_object(bucket, key)
    }

    fn delete_all_objects(&self, bucket: &str, prefix: &str) -> StorageResult<()> {
        let versions = self.client.list_object_versions(bucket, prefix)?;
        if versions.is_empty() {
            debug!(bucket, prefix, "no objects to delete");
            return Ok(());
        }

        let mut failed = Vec::new();
        for batch in versions.chunks(MAX_DELETE_BATCH) {
            let response = self.client.delete_objects(bucket, batch)?;
            failed.extend(response.errors);
        }

        info!(
            bucket,
            prefix,
            deleted = versions.len() - failed.len(),
            "deleted objects from S3"
        );

        match failed.first() {
            None => Ok(()),
            Some((key, message)) => {
                warn!(bucket, failed = failed.len(), "some objects were not deleted");
                Err(StorageError::DeleteFailed {
                    failed: failed.len(),
                    message: format!("{key}: {message}"),
                })
            }
        }
    }
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store").finish_non_exhaustive()
    }
}
