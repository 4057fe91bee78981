//! Scheme to store-constructor registry.

use largemsg_storage::{
    AzureBlobStore, BackingStore, BlobServiceApi, ConnectionParams, FileStore, InMemoryStore,
    S3Api, S3Store, StorageResult,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a backing store from resolved connection parameters.
pub type StoreConstructor =
    Arc<dyn Fn(&ConnectionParams) -> StorageResult<Arc<dyn BackingStore>> + Send + Sync>;

/// Maps URI schemes to the constructors of their backing stores.
///
/// The registry is consulted by [`crate::StoreFactory`] the first time a
/// scheme is needed. Schemes are matched case-insensitively.
///
/// # Built-in schemes
///
/// | Scheme | Store | Parameters |
/// |--------|-------|------------|
/// | `mem`  | [`InMemoryStore`] | none |
/// | `file` | [`FileStore`] | `root_dir` |
/// | `s3`   | [`S3Store`] over `SdkS3Client` (feature `aws`) | `aws_access_key_id`, `aws_secret_access_key`, `region_name`, `endpoint_url` |
/// | `abs`  | [`AzureBlobStore`] over `SdkBlobClient` (feature `azure`) | `conn_str` |
///
/// Either cloud scheme can be served by another transport through
/// [`StoreRegistry::register_s3`] or [`StoreRegistry::register_abs`].
#[derive(Clone)]
pub struct StoreRegistry {
    constructors: HashMap<String, StoreConstructor>,
}

impl StoreRegistry {
    /// Creates a registry with no schemes.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in schemes.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(InMemoryStore::SCHEME, |_| Ok(Arc::new(InMemoryStore::new())));
        registry.register(FileStore::SCHEME, |params| {
            Ok(Arc::new(FileStore::from_params(params)?))
        });
        #[cfg(feature = "aws")]
        registry.register_s3(|params| Ok(Arc::new(largemsg_storage::SdkS3Client::connect(params)?)));
        #[cfg(feature = "azure")]
        registry.register_abs(|params| {
            Ok(Arc::new(largemsg_storage::SdkBlobClient::connect(params)?))
        });
        registry
    }

    /// Registers a constructor for `scheme`, replacing any previous one.
    pub fn register<F>(&mut self, scheme: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ConnectionParams) -> StorageResult<Arc<dyn BackingStore>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(scheme.to_ascii_lowercase(), Arc::new(constructor));
        self
    }

    /// Registers an already constructed store for `scheme`.
    pub fn register_store(&mut self, scheme: &str, store: Arc<dyn BackingStore>) -> &mut Self {
        self.register(scheme, move |_| Ok(Arc::clone(&store)))
    }

    /// Registers the `s3` scheme with a connector that builds the S3 client.
    pub fn register_s3<F>(&mut self, connector: F) -> &mut Self
    where
        F: Fn(&ConnectionParams) -> StorageResult<Arc<dyn S3Api>> + Send + Sync + 'static,
    {
        self.register(S3Store::SCHEME, move |params| {
            Ok(Arc::new(S3Store::new(connector(params)?)))
        })
    }

    /// Registers the `abs` scheme with a connector that builds the blob
    /// service client, typically from the `conn_str` parameter.
    pub fn register_abs<F>(&mut self, connector: F) -> &mut Self
    where
        F: Fn(&ConnectionParams) -> StorageResult<Arc<dyn BlobServiceApi>> + Send + Sync + 'static,
    {
        self.register(AzureBlobStore::SCHEME, move |params| {
            Ok(Arc::new(AzureBlobStore::new(connector(params)?)))
        })
    }

    /// Returns the constructor for `scheme`.
    #[must_use]
    pub fn get(&self, scheme: &str) -> Option<&StoreConstructor> {
        self.constructors.get(&scheme.to_ascii_lowercase())
    }

    /// Returns `true` if `scheme` is registered.
    #[must_use]
    pub fn contains(&self, scheme: &str) -> bool {
        self.get(scheme).is_some()
    }

    /// Returns the registered schemes, sorted.
    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schemes_follow_features() {
        let registry = StoreRegistry::builtin();
        assert!(registry.contains("mem"));
        assert!(registry.contains("file"));
        assert_eq!(registry.contains("s3"), cfg!(feature = "aws"));
        assert_eq!(registry.contains("abs"), cfg!(feature = "azure"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = StoreRegistry::empty();
        registry.register_store("MEM", Arc::new(InMemoryStore::new()));
        assert!(registry.contains("mem"));
        assert!(registry.contains("Mem"));
    }

    #[test]
    fn register_store_returns_same_instance() {
        let store: Arc<dyn BackingStore> = Arc::new(InMemoryStore::new());
        let mut registry = StoreRegistry::empty();
        registry.register_store("mem", Arc::clone(&store));

        let ctor = registry.get("mem").unwrap();
        let built = ctor(&ConnectionParams::new()).unwrap();
        assert!(Arc::ptr_eq(&built, &store));
    }

    #[test]
    fn schemes_are_sorted() {
        let mut registry = StoreRegistry::empty();
        registry
            .register_store("mem", Arc::new(InMemoryStore::new()))
            .register_store("abs", Arc::new(InMemoryStore::new()));
        assert_eq!(registry.schemes(), vec!["abs", "mem"]);
    }
}
