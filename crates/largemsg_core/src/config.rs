//! Offloading configuration.

use crate::error::CoreResult;
use largemsg_codec::Location;
use largemsg_storage::{AzureBlobStore, ConnectionParams, FileStore};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default size threshold: payloads longer than this are backed.
pub const DEFAULT_MAX_SIZE: usize = 1000 * 1000;

/// Hook that may rewrite backend connection parameters before a store is
/// constructed.
pub type CustomConfigHook = Arc<dyn Fn(&mut ConnectionParams) + Send + Sync>;

/// S3 connection parameter names.
mod s3_params {
    pub const ACCESS_KEY: &str = "aws_access_key_id";
    pub const SECRET_KEY: &str = "aws_secret_access_key";
    pub const REGION: &str = "region_name";
    pub const ENDPOINT: &str = "endpoint_url";
}

/// Configuration for encoding and decoding large messages.
#[derive(Clone)]
pub struct Config {
    /// Destination root for backed payloads. Its scheme selects the store,
    /// its bucket receives the objects and its path prefixes every key.
    pub base_path: Option<Location>,

    /// Payloads strictly longer than this many bytes are backed.
    pub max_size: usize,

    /// S3 access key id.
    pub s3_access_key: Option<String>,

    /// S3 secret access key.
    pub s3_secret_key: Option<String>,

    /// S3 region.
    pub s3_region: Option<String>,

    /// S3 endpoint override (e.g. a local S3-compatible service).
    pub s3_endpoint: Option<String>,

    /// Azure storage account connection string.
    pub abs_connection_string: Option<String>,

    /// Root directory for the `file` store.
    pub file_root: Option<PathBuf>,

    /// Mutator applied to connection parameters before store construction.
    pub custom_config: Option<CustomConfigHook>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: None,
            max_size: DEFAULT_MAX_SIZE,
            s3_access_key: None,
            s3_secret_key: None,
            s3_region: None,
            s3_endpoint: None,
            abs_connection_string: None,
            file_root: None,
            custom_config: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    #[must_use]
    pub fn base_path(mut self, base_path: Location) -> Self {
        self.base_path = Some(base_path);
        self
    }

    /// Parses and sets the base path.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` is not a valid location.
    pub fn try_base_path(self, base_path: &str) -> CoreResult<Self> {
        Ok(self.base_path(Location::parse(base_path)?))
    }

    /// Sets the size threshold in bytes.
    #[must_use]
    pub const fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the S3 access key id.
    #[must_use]
    pub fn s3_access_key(mut self, value: impl Into<String>) -> Self {
        self.s3_access_key = Some(value.into());
        self
    }

    /// Sets the S3 secret access key.
    #[must_use]
    pub fn s3_secret_key(mut self, value: impl Into<String>) -> Self {
        self.s3_secret_key = Some(value.into());
        self
    }

    /// Sets the S3 region.
    #[must_use]
    pub fn s3_region(mut self, value: impl Into<String>) -> Self {
        self.s3_region = Some(value.into());
        self
    }

    /// Sets the S3 endpoint override.
    #[must_use]
    pub fn s3_endpoint(mut self, value: impl Into<String>) -> Self {
        self.s3_endpoint = Some(value.into());
        self
    }

    /// Sets the Azure connection string.
    #[must_use]
    pub fn abs_connection_string(mut self, value: impl Into<String>) -> Self {
        self.abs_connection_string = Some(value.into());
        self
    }

    /// Sets the root directory of the `file` store.
    #[must_use]
    pub fn file_root(mut self, value: impl Into<PathBuf>) -> Self {
        self.file_root = Some(value.into());
        self
    }

    /// Sets the connection parameter hook.
    #[must_use]
    pub fn custom_config<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ConnectionParams) + Send + Sync + 'static,
    {
        self.custom_config = Some(Arc::new(hook));
        self
    }

    /// Builds the raw connection parameters for `scheme` from this
    /// configuration, before the custom hook runs.
    #[must_use]
    pub fn connection_params(&self, scheme: &str) -> ConnectionParams {
        let mut params = ConnectionParams::new();
        match scheme {
            "s3" => {
                params.set_opt(s3_params::SECRET_KEY, self.s3_secret_key.as_deref());
                params.set_opt(s3_params::ACCESS_KEY, self.s3_access_key.as_deref());
                params.set_opt(s3_params::REGION, self.s3_region.as_deref());
                params.set_opt(s3_params::ENDPOINT, self.s3_endpoint.as_deref());
            }
            "abs" => {
                params.set_opt(
                    AzureBlobStore::CONNECTION_STRING_PARAM,
                    self.abs_connection_string.as_deref(),
                );
            }
            "file" => {
                if let Some(root) = &self.file_root {
                    params.set(FileStore::ROOT_DIR_PARAM, root.to_string_lossy());
                }
            }
            _ => {}
        }
        params
    }

    /// Connection parameters for `scheme` after the custom hook ran.
    #[must_use]
    pub fn resolved_params(&self, scheme: &str) -> ConnectionParams {
        let mut params = self.connection_params(scheme);
        if let Some(hook) = &self.custom_config {
            hook(&mut params);
        }
        params
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("base_path", &self.base_path.as_ref().map(ToString::to_string))
            .field("max_size", &self.max_size)
            .field("s3_access_key", &self.s3_access_key)
            .field("s3_secret_key", &redact(&self.s3_secret_key))
            .field("s3_region", &self.s3_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("abs_connection_string", &redact(&self.abs_connection_string))
            .field("file_root", &self.file_root)
            .field("custom_config", &self.custom_config.is_some())
            .finish()
    }
}
