//! In-memory backing store for testing.

use crate::backend::{object_address, BackingStore};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory backing store.
///
/// This store keeps all objects in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Pipelines that only need offloading within one process
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use largemsg_storage::{BackingStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let address = store.put(b"payload", "bucket", "a/b").unwrap();
/// assert_eq!(address, "mem://bucket/a/b");
/// assert_eq!(store.get("bucket", "a/b").unwrap(), b"payload");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    /// The scheme of addresses produced by this store.
    pub const SCHEME: &'static str = "mem";

    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sorted keys stored in `bucket`.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `key` exists in `bucket`.
    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .read()
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    /// Removes all objects from all buckets.
    pub fn clear(&self) {
        self.buckets.write().clear();
    }
}

impl BackingStore for InMemoryStore {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    fn put(&self, data: &[u8], bucket: &str, key: &str) -> StorageResult<String> {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.to_vec());
        Ok(object_address(Self::SCHEME, bucket, key))
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.buckets
            .read()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    fn delete_all_objects(&self, bucket: &str, prefix: &str) -> StorageResult<()> {
        let mut buckets = self.buckets.write();
        if let Some(objects) = buckets.get_mut(bucket) {
            objects.retain(|key, _| !key.starts_with(prefix));
        }
        Ok(())
    }
}
