//! Per-topic serializer pairing an encoder with a decoder.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CoreResult;
use crate::factory::StoreFactory;
use crate::naming::RecordRole;
use std::sync::Arc;

/// Serializer bound to one topic and one record role.
///
/// A host pipeline registers one of these per topic for keys and another for
/// values. Both share the factory and therefore its cached clients.
///
/// ```
/// use largemsg_core::{Config, LargeMessageSerde, StoreFactory};
/// use std::sync::Arc;
///
/// let config = Config::new().try_base_path("mem://bucket").unwrap().max_size(8);
/// let factory = Arc::new(StoreFactory::new(config));
/// let serde = LargeMessageSerde::new(factory, "orders", false);
///
/// let wire = serde.serialize(Some(b"a payload too large to inline")).unwrap();
/// assert_eq!(wire.as_ref().map(|w| w[0]), Some(0x01));
/// let back = serde.deserialize(wire.as_deref()).unwrap();
/// assert_eq!(back.as_deref(), Some(&b"a payload too large to inline"[..]));
/// ```
#[derive(Debug, Clone)]
pub struct LargeMessageSerde {
    topic: String,
    role: RecordRole,
    encoder: Encoder,
    decoder: Decoder,
}

impl LargeMessageSerde {
    /// Creates a serializer for `topic`.
    #[must_use]
    pub fn new(factory: Arc<StoreFactory>, topic: impl Into<String>, is_key: bool) -> Self {
        Self {
            topic: topic.into(),
            role: RecordRole::from_is_key(is_key),
            encoder: factory.encoder(),
            decoder: factory.decoder(),
        }
    }

    /// Returns the topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns `true` if this serializer handles record keys.
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.role == RecordRole::Key
    }

    /// Returns the record role.
    #[must_use]
    pub fn role(&self) -> RecordRole {
        self.role
    }

    /// Encodes a payload. See [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Propagates encoder errors.
    pub fn serialize(&self, data: Option<&[u8]>) -> CoreResult<Option<Vec<u8>>> {
        self.encoder.encode(&self.topic, data, self.is_key())
    }

    /// Decodes a payload. See [`Decoder::decode`].
    ///
    /// # Errors
    ///
    /// Propagates decoder errors.
    pub fn deserialize(&self, data: Option<&[u8]>) -> CoreResult<Option<Vec<u8>>> {
        self.decoder.decode(data)
    }
}
