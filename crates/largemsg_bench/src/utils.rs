//! Benchmark utilities.

use largemsg_core::{Config, StoreFactory, StoreRegistry};
use largemsg_storage::{FileStore, InMemoryStore};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Factory backing payloads over `max_size` into an in-memory store.
pub fn memory_factory(max_size: usize) -> (Arc<InMemoryStore>, Arc<StoreFactory>) {
    let store = Arc::new(InMemoryStore::new());
    let mut registry = StoreRegistry::empty();
    registry.register_store(InMemoryStore::SCHEME, store.clone());
    let config = Config::new()
        .try_base_path("mem://bench")
        .expect("Invalid base path")
        .max_size(max_size);
    (store, Arc::new(StoreFactory::with_registry(config, registry)))
}

/// Factory backing payloads over `max_size` into files under `root`.
pub fn file_factory(root: &Path, max_size: usize) -> Arc<StoreFactory> {
    let store = Arc::new(FileStore::open(root).expect("Failed to open file store"));
    let mut registry = StoreRegistry::empty();
    registry.register_store(FileStore::SCHEME, store);
    let config = Config::new()
        .try_base_path("file://bench")
        .expect("Invalid base path")
        .max_size(max_size);
    Arc::new(StoreFactory::with_registry(config, registry))
}
