//! Property-based test generators using proptest.
//!
//! Provides strategies for generating payloads, topics and locations that
//! satisfy the invariants the encoder and decoder rely on.

use largemsg_codec::{Envelope, Location};
use proptest::prelude::*;

/// Strategy for arbitrary payloads up to `max_len` bytes.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for topic names as used by message brokers.
pub fn topic_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9._-]{0,48}").expect("Invalid regex")
}

/// Strategy for schemes of registered stores.
pub fn scheme_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["mem", "file", "s3", "abs"])
}

/// Strategy for valid bucket names.
pub fn bucket_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9][a-z0-9.-]{2,30}").expect("Invalid regex")
}

/// Strategy for object keys: one to five non-empty segments.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::string::string_regex("[A-Za-z0-9_-]{1,12}").expect("Invalid regex"),
        1..=5,
    )
    .prop_map(|segments| segments.join("/"))
}

/// Strategy for parsed locations.
pub fn location_strategy() -> impl Strategy<Value = Location> {
    (scheme_strategy(), bucket_strategy(), key_strategy()).prop_map(|(scheme, bucket, key)| {
        Location::new(scheme, &bucket, &key).expect("Generated location must be valid")
    })
}

/// Strategy for envelopes of either kind.
pub fn envelope_strategy() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        payload_strategy(256).prop_map(Envelope::Literal),
        location_strategy().prop_map(Envelope::Reference),
    ]
}

/// Strategy for flag bytes that are neither sentinel.
pub fn invalid_flag_strategy() -> impl Strategy<Value = u8> {
    2u8..=u8::MAX
}
