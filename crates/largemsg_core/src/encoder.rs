//! Write path: decide, upload, envelope.

use crate::error::{CoreError, CoreResult};
use crate::factory::StoreFactory;
use crate::naming::{make_key, RecordRole};
use largemsg_codec::{Envelope, Location};
use std::sync::Arc;
use tracing::debug;

/// Encodes payloads into wire envelopes, offloading oversized ones.
///
/// The threshold and base path are captured from the factory's
/// configuration when the encoder is created.
#[derive(Debug, Clone)]
pub struct Encoder {
    factory: Arc<StoreFactory>,
    base_path: Option<Location>,
    max_size: usize,
}

impl Encoder {
    /// Creates an encoder over `factory`.
    #[must_use]
    pub fn new(factory: Arc<StoreFactory>) -> Self {
        let base_path = factory.config().base_path.clone();
        let max_size = factory.config().max_size;
        Self {
            factory,
            base_path,
            max_size,
        }
    }

    /// Returns the size threshold in bytes.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the base path backed payloads are written under.
    #[must_use]
    pub fn base_path(&self) -> Option<&Location> {
        self.base_path.as_ref()
    }

    /// Returns `true` if a payload of `len` bytes would be backed.
    #[must_use]
    pub fn needs_backing(&self, len: usize) -> bool {
        len > self.max_size
    }

    /// Encodes a payload for `topic`.
    ///
    /// `None` encodes to `None`. Payloads up to the threshold are sent
    /// inline; longer ones are uploaded and replaced by their address.
    ///
    /// # Errors
    ///
    /// Fails if the payload needs backing and no base path is configured,
    /// the scheme is unsupported, or the upload fails. There is no fallback
    /// to inline encoding.
    pub fn encode(&self, topic: &str, data: Option<&[u8]>, is_key: bool) -> CoreResult<Option<Vec<u8>>> {
        let Some(data) = data else {
            return Ok(None);
        };
        let envelope = self.envelope(topic, data, RecordRole::from_is_key(is_key))?;
        Ok(Some(envelope.to_bytes()))
    }

    /// Builds the envelope for a payload, uploading it if it is too large.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn envelope(&self, topic: &str, data: &[u8], role: RecordRole) -> CoreResult<Envelope> {
        if !self.needs_backing(data.len()) {
            return Ok(Envelope::Literal(data.to_vec()));
        }

        let base = self.base_path.as_ref().ok_or(CoreError::MissingBasePath)?;
        let key = make_key(Some(base), topic, role)?;
        let client = self.factory.client_for(base)?;
        let address = client.put(data, base.bucket(), &key)?;
        debug!(topic, size = data.len(), address = %address, "stored payload in backing store");

        Ok(Envelope::Reference(Location::parse(&address)?))
    }
}
