//! Store factory caching and connection parameter handling.

use largemsg_core::{Config, CoreError, StoreFactory, StoreRegistry};
use largemsg_storage::{InMemoryStore, S3Api};
use largemsg_testkit::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn repeated_resolution_returns_same_client() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("s3://bucket", 1));

    let a = factory.default_client().unwrap();
    let b = factory.default_client().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(stores.s3_connects.load(Ordering::SeqCst), 1);
}

#[test]
fn encoder_and_decoder_share_client() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("s3://bucket", 1));

    let wire = factory.encoder().encode("t", Some(b"abc"), false).unwrap();
    factory.decoder().decode(wire.as_deref()).unwrap();
    factory.encoder().encode("t", Some(b"def"), false).unwrap();

    assert_eq!(stores.s3_connects.load(Ordering::SeqCst), 1);
    assert_eq!(factory.cached_schemes(), vec!["s3".to_string()]);
}

#[test]
fn custom_hook_runs_once_with_s3_params() {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(parking_lot::Mutex::new(None));

    let calls = Arc::clone(&hook_calls);
    let config = config_for("s3://bucket", 1)
        .s3_access_key("AKIA")
        .s3_secret_key("secret")
        .s3_region("us-east-1")
        .custom_config(move |params| {
            calls.fetch_add(1, Ordering::SeqCst);
            params.set("endpoint_url", "http://localhost:4566");
        });

    let s3 = Arc::new(MockS3::new());
    let captured = Arc::clone(&seen);
    let mut registry = StoreRegistry::empty();
    registry.register_s3(move |params| {
        *captured.lock() = Some(params.clone());
        let client: Arc<dyn S3Api> = s3.clone();
        Ok(client)
    });
    let factory = StoreFactory::with_registry(config, registry);

    factory.default_client().unwrap();
    factory.default_client().unwrap();

    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    let params = seen.lock().clone().unwrap();
    assert_eq!(params.get("aws_access_key_id"), Some("AKIA"));
    assert_eq!(params.get("aws_secret_access_key"), Some("secret"));
    assert_eq!(params.get("region_name"), Some("us-east-1"));
    assert_eq!(params.get("endpoint_url"), Some("http://localhost:4566"));
}

#[test]
fn abs_receives_connection_string() {
    let seen = Arc::new(parking_lot::Mutex::new(String::new()));
    let captured = Arc::clone(&seen);
    let blobs = Arc::new(MockBlobService::new());

    let mut registry = StoreRegistry::empty();
    registry.register_abs(move |params| {
        *captured.lock() = params.require("conn_str")?.to_string();
        Ok(blobs.clone())
    });
    let config = config_for("abs://container", 1).abs_connection_string("AccountName=dev");
    let factory = StoreFactory::with_registry(config, registry);

    factory.default_client().unwrap();
    assert_eq!(seen.lock().as_str(), "AccountName=dev");
}

#[test]
fn missing_connection_string_fails_construction() {
    let mut registry = StoreRegistry::empty();
    registry.register_abs(|params| {
        params.require("conn_str")?;
        Ok(Arc::new(MockBlobService::new()))
    });
    let factory = StoreFactory::with_registry(config_for("abs://container", 1), registry);

    let err = factory.default_client().err().unwrap();
    assert!(matches!(
        err,
        CoreError::Storage(largemsg_storage::StorageError::MissingParameter { ref name }) if name == "conn_str"
    ));
    assert!(factory.cached_schemes().is_empty());
}

#[test]
fn unknown_scheme_is_named_in_error() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("gcs://bucket", 1));

    let err = factory.encoder().encode("t", Some(b"xy"), false).unwrap_err();
    assert_eq!(err.to_string(), "the scheme gcs is not supported");
}

#[test]
fn missing_base_path_only_fails_when_backing() {
    let stores = TestStores::new();
    let factory = stores.factory(Config::new().max_size(4));
    let encoder = factory.encoder();

    assert!(encoder.encode("t", Some(b"tiny"), false).is_ok());
    let err = encoder.encode("t", Some(b"too large"), false).unwrap_err();
    assert!(matches!(err, CoreError::MissingBasePath));
    assert_eq!(err.to_string(), "base path must not be null");
}

#[test]
fn concurrent_first_use_constructs_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let mut registry = StoreRegistry::empty();
    registry.register("mem", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(20));
        Ok(Arc::new(InMemoryStore::new()))
    });
    let factory = Arc::new(StoreFactory::with_registry(memory_config(1), registry));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let factory = Arc::clone(&factory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let payload = vec![i as u8; 16];
                let wire = factory.encoder().encode("t", Some(&payload), false).unwrap();
                let back = factory.decoder().decode(wire.as_deref()).unwrap();
                assert_eq!(back, Some(payload));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}
