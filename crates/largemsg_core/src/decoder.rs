//! Read path: unwrap envelopes and fetch backed payloads.

use crate::error::CoreResult;
use crate::factory::StoreFactory;
use largemsg_codec::{Envelope, Location};
use std::sync::Arc;
use tracing::debug;

/// Decodes wire envelopes back into the original payloads.
///
/// A backed envelope is resolved through the store registered for the
/// address's own scheme, which need not match the configured base path.
/// Decoding never writes to or deletes from a store.
#[derive(Debug, Clone)]
pub struct Decoder {
    factory: Arc<StoreFactory>,
}

impl Decoder {
    /// Creates a decoder over `factory`.
    #[must_use]
    pub fn new(factory: Arc<StoreFactory>) -> Self {
        Self { factory }
    }

    /// Decodes a wire message. `None` decodes to `None`.
    ///
    /// # Errors
    ///
    /// - `InvalidEnvelope` if the input is empty or the flag is unknown
    /// - `InvalidUtf8` or `MalformedUri` if a backed address is unreadable
    /// - `UnsupportedScheme` if no store serves the address's scheme
    /// - the store's error if the fetch fails
    pub fn decode(&self, data: Option<&[u8]>) -> CoreResult<Option<Vec<u8>>> {
        let Some(data) = data else {
            return Ok(None);
        };
        match Envelope::from_bytes(data)? {
            Envelope::Literal(payload) => Ok(Some(payload)),
            Envelope::Reference(location) => self.fetch(&location).map(Some),
        }
    }

    /// Fetches the payload stored at `location`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn fetch(&self, location: &Location) -> CoreResult<Vec<u8>> {
        let client = self.factory.client_for(location)?;
        let payload = client.get(location.bucket(), location.path())?;
        debug!(location = %location, size = payload.len(), "fetched payload from backing store");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::CoreError;
    use crate::registry::StoreRegistry;
    use largemsg_codec::CodecError;
    use largemsg_storage::{BackingStore, InMemoryStore};

    fn setup() -> (Arc<InMemoryStore>, Arc<StoreFactory>) {
        let store = Arc::new(InMemoryStore::new());
        let mut registry = StoreRegistry::empty();
        registry.register_store("mem", store.clone());
        let config = Config::new().try_base_path("mem://bucket").unwrap().max_size(4);
        (store, Arc::new(StoreFactory::with_registry(config, registry)))
    }

    #[test]
    fn none_decodes_to_none() {
        let (_, factory) = setup();
        assert_eq!(factory.decoder().decode(None).unwrap(), None);
    }

    #[test]
    fn inline_payload_is_returned_verbatim() {
        let (_, factory) = setup();
        let decoded = factory.decoder().decode(Some(b"\x00short")).unwrap();
        assert_eq!(decoded.as_deref(), Some(&b"short"[..]));

        let empty = factory.decoder().decode(Some(&[0x00])).unwrap();
        assert_eq!(empty, Some(Vec::new()));
    }

    #[test]
    fn reference_is_fetched() {
        let (store, factory) = setup();
        store.put(b"stored bytes", "bucket", "orders/values/1").unwrap();

        let decoded = factory
            .decoder()
            .decode(Some(b"\x01mem://bucket/orders/values/1"))
            .unwrap();
        assert_eq!(decoded.as_deref(), Some(&b"stored bytes"[..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let (_, factory) = setup();
        let err = factory.decoder().decode(Some(b"\x02whatever")).unwrap_err();
        assert!(err.is_invalid_envelope());
        assert!(err.to_string().contains("backed or non-backed"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let (_, factory) = setup();
        let err = factory.decoder().decode(Some(&[])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Codec(CodecError::InvalidEnvelope { flag: None })
        ));
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_, factory) = setup();
        let err = factory
            .decoder()
            .decode(Some(b"\x01mem://bucket/gone"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn reference_scheme_selects_store() {
        let (_, factory) = setup();
        let err = factory
            .decoder()
            .decode(Some(b"\x01abs://container/x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedScheme { ref scheme } if scheme == "abs"));
    }

    #[test]
    fn malformed_reference_is_rejected() {
        let (_, factory) = setup();
        let err = factory.decoder().decode(Some(b"\x01not a uri")).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::MalformedUri { .. })));

        let err = factory.decoder().decode(Some(b"\x01\xff\xfe")).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::InvalidUtf8)));
    }
}
