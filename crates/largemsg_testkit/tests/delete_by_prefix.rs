//! Bulk delete-by-prefix against every backing store.

use largemsg_core::{BackingStore, RecordRole, StoreFactory};
use largemsg_testkit::prelude::*;
use std::sync::Arc;

fn seed(store: &dyn BackingStore, bucket: &str) {
    store.put(b"1", bucket, "foo/1").unwrap();
    store.put(b"2", bucket, "foo/2").unwrap();
    store.put(b"3", bucket, "bar/1").unwrap();
}

fn client(factory: &Arc<StoreFactory>) -> Arc<dyn BackingStore> {
    factory.default_client().unwrap()
}

#[test]
fn removes_exactly_the_prefixed_objects() {
    for base in ["mem://bucket", "file://bucket", "s3://bucket", "abs://bucket"] {
        let stores = TestStores::new();
        let factory = stores.factory(config_for(base, 1));
        let store = client(&factory);

        seed(store.as_ref(), "bucket");
        store.delete_all_objects("bucket", "foo").unwrap();

        assert!(store.get("bucket", "foo/1").unwrap_err().is_not_found(), "{base}");
        assert!(store.get("bucket", "foo/2").unwrap_err().is_not_found(), "{base}");
        assert_eq!(store.get("bucket", "bar/1").unwrap(), b"3", "{base}");
    }
}

#[test]
fn empty_prefix_match_is_a_no_op() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("s3://bucket", 1));
    let store = client(&factory);

    store.put(b"x", "bucket", "bar/1").unwrap();
    store.delete_all_objects("bucket", "foo").unwrap();

    assert_eq!(stores.s3.list_calls(), 1);
    assert!(stores.s3.delete_batches().is_empty());
    assert_eq!(stores.s3.keys("bucket"), vec!["bar/1".to_string()]);
}

#[test]
fn s3_removes_every_version() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("s3://bucket", 1));
    let store = client(&factory);

    for _ in 0..3 {
        store.put(b"v", "bucket", "foo/1").unwrap();
    }
    assert_eq!(stores.s3.version_count("bucket", "foo/1"), 3);

    store.delete_all_objects("bucket", "foo").unwrap();
    assert_eq!(stores.s3.version_count("bucket", "foo/1"), 0);
    assert_eq!(stores.s3.delete_batches(), vec![3]);
}

#[test]
fn s3_batches_large_deletes() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("s3://bucket", 1));
    let store = client(&factory);

    for i in 0..2_500 {
        store.put(b"x", "bucket", &format!("foo/{i}")).unwrap();
    }
    store.delete_all_objects("bucket", "foo/").unwrap();

    assert_eq!(stores.s3.delete_batches(), vec![1000, 1000, 500]);
    assert!(stores.s3.keys("bucket").is_empty());
}

#[test]
fn s3_refused_keys_are_reported() {
    let stores = TestStores::new();
    stores.s3.refuse_delete("foo/2");
    let factory = stores.factory(config_for("s3://bucket", 1));
    let store = client(&factory);
    seed(store.as_ref(), "bucket");

    let err = store.delete_all_objects("bucket", "foo").unwrap_err();
    assert!(matches!(
        err,
        largemsg_storage::StorageError::DeleteFailed { failed: 1, .. }
    ));
    assert_eq!(stores.s3.keys("bucket"), vec!["bar/1".to_string(), "foo/2".to_string()]);
}

#[test]
fn abs_deletes_blob_by_blob() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("abs://bucket", 1));
    seed(client(&factory).as_ref(), "bucket");

    factory.purge_prefix("foo").unwrap();
    assert_eq!(stores.blobs.delete_calls(), 2);
    assert_eq!(stores.blobs.names("bucket"), vec!["bar/1".to_string()]);
}

#[test]
fn purge_topic_removes_encoded_payloads() {
    let stores = TestStores::new();
    let factory = stores.factory(config_for("file://bucket/root", 1));
    let encoder = factory.encoder();

    let value = encoder.encode("orders", Some(b"value"), false).unwrap();
    let key = encoder.encode("orders", Some(b"key"), true).unwrap();
    let other = encoder.encode("payments", Some(b"other"), false).unwrap();

    factory.purge_topic("orders", Some(RecordRole::Value)).unwrap();
    let decoder = factory.decoder();
    assert!(decoder.decode(value.as_deref()).unwrap_err().is_not_found());
    assert_eq!(decoder.decode(key.as_deref()).unwrap().unwrap(), b"key");

    factory.purge_topic("orders", None).unwrap();
    assert!(decoder.decode(key.as_deref()).unwrap_err().is_not_found());
    assert_eq!(decoder.decode(other.as_deref()).unwrap().unwrap(), b"other");
}
