//! Backing store resolution and caching.

use crate::config::Config;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{CoreError, CoreResult};
use crate::naming::{topic_prefix, RecordRole};
use crate::registry::StoreRegistry;
use largemsg_codec::Location;
use largemsg_storage::BackingStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves schemes to backing store clients for one configuration.
///
/// The first request for a scheme builds its connection parameters from the
/// [`Config`], runs the custom hook over them and calls the registered
/// constructor. The resulting client is cached; every later request for the
/// scheme returns the identical instance.
///
/// # Thread Safety
///
/// Each scheme has its own cache slot. The slot's lock is held during
/// construction, so concurrent first use builds a client at most once,
/// while lookups of other schemes proceed without waiting for it.
pub struct StoreFactory {
    config: Config,
    registry: StoreRegistry,
    clients: Mutex<HashMap<String, ClientSlot>>,
}

/// Cache entry for one scheme; `None` until construction succeeds.
type ClientSlot = Arc<Mutex<Option<Arc<dyn BackingStore>>>>;

impl StoreFactory {
    /// Creates a factory with the built-in registry.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, StoreRegistry::builtin())
    }

    /// Creates a factory with a custom registry.
    #[must_use]
    pub fn with_registry(config: Config, registry: StoreRegistry) -> Self {
        Self {
            config,
            registry,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Returns the client for the scheme of `location`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedScheme`] if no constructor is registered
    /// - [`CoreError::Storage`] if construction fails
    pub fn client_for(&self, location: &Location) -> CoreResult<Arc<dyn BackingStore>> {
        self.client_for_scheme(location.scheme())
    }

    /// Returns the client for `scheme`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// See [`StoreFactory::client_for`].
    pub fn client_for_scheme(&self, scheme: &str) -> CoreResult<Arc<dyn BackingStore>> {
        let scheme = scheme.to_ascii_lowercase();
        let constructor = self
            .registry
            .get(&scheme)
            .ok_or_else(|| CoreError::UnsupportedScheme {
                scheme: scheme.clone(),
            })?;

        // The map lock only guards slot lookup.
        let slot = Arc::clone(self.clients.lock().entry(scheme.clone()).or_default());

        let mut cached = slot.lock();
        if let Some(client) = cached.as_ref() {
            return Ok(Arc::clone(client));
        }
        let params = self.config.resolved_params(&scheme);
        let client = constructor(&params)?;
        debug!(scheme = %scheme, "created backing store client");

        *cached = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Returns the client for the configured base path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingBasePath`] if no base path is configured,
    /// otherwise see [`StoreFactory::client_for`].
    pub fn default_client(&self) -> CoreResult<Arc<dyn BackingStore>> {
        self.client_for(self.base_path()?)
    }

    /// Returns the schemes whose clients have been constructed, sorted.
    #[must_use]
    pub fn cached_schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self
            .clients
            .lock()
            .iter()
            // A slot locked elsewhere is still being constructed.
            .filter(|(_, slot)| slot.try_lock().is_some_and(|client| client.is_some()))
            .map(|(scheme, _)| scheme.clone())
            .collect();
        schemes.sort_unstable();
        schemes
    }

    /// Creates an encoder over this factory.
    #[must_use]
    pub fn encoder(self: &Arc<Self>) -> Encoder {
        Encoder::new(Arc::clone(self))
    }

    /// Creates a decoder over this factory.
    #[must_use]
    pub fn decoder(self: &Arc<Self>) -> Decoder {
        Decoder::new(Arc::clone(self))
    }

    /// Deletes every backed payload in the base path bucket whose key starts
    /// with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingBasePath`] without a base path, or the
    /// store's error if deletion fails.
    pub fn purge_prefix(&self, prefix: &str) -> CoreResult<()> {
        let base = self.base_path()?;
        let client = self.client_for(base)?;
        client.delete_all_objects(base.bucket(), prefix)?;
        info!(bucket = base.bucket(), prefix, "purged backed payloads");
        Ok(())
    }

    /// Deletes every backed payload written for `topic`, optionally only
    /// those of one record role.
    ///
    /// # Errors
    ///
    /// See [`StoreFactory::purge_prefix`].
    pub fn purge_topic(&self, topic: &str, role: Option<RecordRole>) -> CoreResult<()> {
        let prefix = topic_prefix(self.config.base_path.as_ref(), topic, role)?;
        self.purge_prefix(&prefix)
    }

    fn base_path(&self) -> CoreResult<&Location> {
        self.config
            .base_path
            .as_ref()
            .ok_or(CoreError::MissingBasePath)
    }
}

impl fmt::Debug for StoreFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreFactory")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("cached", &self.cached_schemes())
            .finish()
    }
}
