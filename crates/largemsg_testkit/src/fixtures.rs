//! Test fixtures and factory helpers.
//!
//! Provides ready-made configurations and a bundle of backing stores
//! registered under every scheme, so tests can drive the encoder and decoder
//! against any backend without network access.

use crate::mocks::{MockBlobService, MockS3};
use largemsg_core::{Config, StoreFactory, StoreRegistry};
use largemsg_storage::{FileStore, InMemoryStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Bucket used by the default fixtures.
pub const TEST_BUCKET: &str = "bucket";

/// Returns a configuration backing payloads longer than `max_size` into
/// `mem://bucket`.
pub fn memory_config(max_size: usize) -> Config {
    config_for(&format!("mem://{TEST_BUCKET}"), max_size)
}

/// Returns a configuration with the given base path and threshold.
pub fn config_for(base_path: &str, max_size: usize) -> Config {
    Config::new()
        .try_base_path(base_path)
        .expect("Invalid test base path")
        .max_size(max_size)
}

/// One instance of every backing store, each registered under its scheme.
///
/// The S3 and Azure stores run over [`MockS3`] and [`MockBlobService`];
/// the file store lives in a temporary directory removed on drop.
pub struct TestStores {
    /// Store behind `mem://`.
    pub memory: Arc<InMemoryStore>,
    /// Service behind `s3://`.
    pub s3: Arc<MockS3>,
    /// Service behind `abs://`.
    pub blobs: Arc<MockBlobService>,
    /// Number of times the `s3` connector ran.
    pub s3_connects: Arc<AtomicUsize>,
    /// Number of times the `abs` connector ran.
    pub abs_connects: Arc<AtomicUsize>,
    temp_dir: TempDir,
}

impl TestStores {
    /// Creates fresh stores.
    pub fn new() -> Self {
        Self {
            memory: Arc::new(InMemoryStore::new()),
            s3: Arc::new(MockS3::new()),
            blobs: Arc::new(MockBlobService::new()),
            s3_connects: Arc::new(AtomicUsize::new(0)),
            abs_connects: Arc::new(AtomicUsize::new(0)),
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Root directory of the file store.
    pub fn file_root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Opens the file store directly, e.g. to inspect what was written.
    pub fn file_store(&self) -> FileStore {
        FileStore::open(self.file_root()).expect("Failed to open file store")
    }

    /// Builds a registry serving `mem`, `file`, `s3` and `abs` from these
    /// stores.
    pub fn registry(&self) -> StoreRegistry {
        let mut registry = StoreRegistry::empty();
        registry.register_store(InMemoryStore::SCHEME, self.memory.clone());

        let root = self.file_root().to_path_buf();
        registry.register(FileStore::SCHEME, move |_| Ok(Arc::new(FileStore::open(&root)?)));

        let s3 = Arc::clone(&self.s3);
        let s3_connects = Arc::clone(&self.s3_connects);
        registry.register_s3(move |_| {
            s3_connects.fetch_add(1, Ordering::SeqCst);
            Ok(s3.clone())
        });

        let blobs = Arc::clone(&self.blobs);
        let abs_connects = Arc::clone(&self.abs_connects);
        registry.register_abs(move |_| {
            abs_connects.fetch_add(1, Ordering::SeqCst);
            Ok(blobs.clone())
        });

        registry
    }

    /// Builds a factory over these stores.
    pub fn factory(&self, config: Config) -> Arc<StoreFactory> {
        Arc::new(StoreFactory::with_registry(config, self.registry()))
    }
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_serves_every_scheme() {
        let stores = TestStores::new();
        let registry = stores.registry();
        assert_eq!(registry.schemes(), vec!["abs", "file", "mem", "s3"]);
    }

    #[test]
    fn memory_config_points_at_test_bucket() {
        let config = memory_config(16);
        assert_eq!(config.max_size, 16);
        assert_eq!(config.base_path.unwrap().to_string(), "mem://bucket");
    }
}
