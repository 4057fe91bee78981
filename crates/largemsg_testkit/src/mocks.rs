//! In-memory stand-ins for object storage services.
//!
//! [`MockS3`] and [`MockBlobService`] implement the service traits the S3
//! and Azure stores are written against, so those stores can be exercised
//! end to end without network access.

use largemsg_storage::{
    BlobServiceApi, DeleteObjectsResponse, ObjectVersion, PutObjectResponse, S3Api, StorageError,
    StorageResult,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A versioned in-memory S3 bucket set.
///
/// Every upload adds a new version; `get_object` returns the latest one.
/// Call counters let tests assert how the store drove the service.
#[derive(Debug, Default)]
pub struct MockS3 {
    objects: RwLock<BTreeMap<(String, String), Vec<(String, Vec<u8>)>>>,
    next_version: AtomicUsize,
    put_status: Mutex<Option<u16>>,
    refused_keys: Mutex<HashSet<String>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
    lists: AtomicUsize,
    delete_batches: Mutex<Vec<usize>>,
}

impl MockS3 {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later upload answer with `status` instead of storing.
    pub fn fail_puts_with(&self, status: u16) {
        *self.put_status.lock() = Some(status);
    }

    /// Makes `DeleteObjects` refuse `key`.
    pub fn refuse_delete(&self, key: impl Into<String>) {
        self.refused_keys.lock().insert(key.into());
    }

    /// Returns the latest keys stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Returns the number of stored versions of `key`.
    pub fn version_count(&self, bucket: &str, key: &str) -> usize {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .map_or(0, Vec::len)
    }

    /// Number of `PutObject` calls.
    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `GetObject` calls.
    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `ListObjectVersions` calls.
    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Sizes of the `DeleteObjects` batches received, in order.
    pub fn delete_batches(&self) -> Vec<usize> {
        self.delete_batches.lock().clone()
    }
}

impl S3Api for MockS3 {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<PutObjectResponse> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.put_status.lock() {
            return Ok(PutObjectResponse {
                status,
                raw: format!("<Error><Code>{status}</Code></Error>"),
            });
        }
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        self.objects
            .write()
            .entry((bucket.to_string(), key.to_string()))
            .or_default()
            .push((format!("v{version}"), body.to_vec()));
        Ok(PutObjectResponse::ok())
    }

    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|versions| versions.last())
            .map(|(_, data)| data.clone())
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    fn list_object_versions(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectVersion>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .read()
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .flat_map(|((_, k), versions)| {
                versions.iter().map(move |(id, _)| ObjectVersion {
                    key: k.clone(),
                    version_id: Some(id.clone()),
                })
            })
            .collect())
    }

    fn delete_objects(
        &self,
        bucket: &str,
        objects: &[ObjectVersion],
    ) -> StorageResult<DeleteObjectsResponse> {
        self.delete_batches.lock().push(objects.len());
        let refused = self.refused_keys.lock();
        let mut stored = self.objects.write();
        let mut response = DeleteObjectsResponse::default();

        for obj in objects {
            if refused.contains(&obj.key) {
                response.errors.push((obj.key.clone(), "AccessDenied".to_string()));
                continue;
            }
            let entry = (bucket.to_string(), obj.key.clone());
            if let Some(versions) = stored.get_mut(&entry) {
                versions.retain(|(id, _)| Some(id) != obj.version_id.as_ref());
                if versions.is_empty() {
                    stored.remove(&entry);
                }
            }
        }
        Ok(response)
    }
}

/// An in-memory Azure Blob service.
#[derive(Debug, Default)]
pub struct MockBlobService {
    blobs: RwLock<BTreeMap<(String, String), Vec<u8>>>,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockBlobService {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the blob names stored in `container`, sorted.
    pub fn names(&self, container: &str) -> Vec<String> {
        self.blobs
            .read()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, n)| n.clone())
            .collect()
    }

    /// Number of uploads.
    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Number of single-blob deletes.
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl BlobServiceApi for MockBlobService {
    fn upload_blob(&self, container: &str, name: &str, data: &[u8]) -> StorageResult<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .write()
            .insert((container.to_string(), name.to_string()), data.to_vec());
        Ok(())
    }

    fn download_blob(&self, container: &str, name: &str) -> StorageResult<Vec<u8>> {
        self.blobs
            .read()
            .get(&(container.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(container, name))
    }

    fn list_blobs(&self, container: &str, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .blobs
            .read()
            .keys()
            .filter(|(c, n)| c == container && n.starts_with(prefix))
            .map(|(_, n)| n.clone())
            .collect())
    }

    fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .write()
            .remove(&(container.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(container, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_s3_keeps_versions() {
        let s3 = MockS3::new();
        s3.put_object("b", "k", b"one").unwrap();
        s3.put_object("b", "k", b"two").unwrap();

        assert_eq!(s3.version_count("b", "k"), 2);
        assert_eq!(s3.get_object("b", "k").unwrap(), b"two");
        assert_eq!(s3.list_object_versions("b", "").unwrap().len(), 2);
        assert_eq!(s3.put_calls(), 2);
    }

    #[test]
    fn mock_s3_failing_puts() {
        let s3 = MockS3::new();
        s3.fail_puts_with(503);
        let response = s3.put_object("b", "k", b"x").unwrap();
        assert_eq!(response.status, 503);
        assert!(s3.keys("b").is_empty());
    }

    #[test]
    fn mock_blobs_list_by_prefix() {
        let blobs = MockBlobService::new();
        blobs.upload_blob("c", "foo/1", b"a").unwrap();
        blobs.upload_blob("c", "bar/1", b"b").unwrap();
        assert_eq!(blobs.list_blobs("c", "foo").unwrap(), vec!["foo/1".to_string()]);
        assert!(blobs.delete_blob("c", "nope").unwrap_err().is_not_found());
    }
}
