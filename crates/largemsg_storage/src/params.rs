//! Raw connection parameters handed to store constructors.

use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;

/// Backend connection parameters, keyed by backend-specific names such as
/// `aws_access_key_id` or `conn_str`.
///
/// Parameters are built from configuration and may be rewritten by a
/// caller-supplied hook before a store is constructed, so callers can inject
/// options without the factory knowing their names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConnectionParams {
    values: BTreeMap<String, String>,
}

impl ConnectionParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Sets a parameter only when a value is present.
    pub fn set_opt(&mut self, name: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns a parameter value or a [`StorageError::MissingParameter`].
    ///
    /// # Errors
    ///
    /// Fails if the parameter is absent.
    pub fn require(&self, name: &str) -> StorageResult<&str> {
        self.get(name).ok_or_else(|| StorageError::MissingParameter {
            name: name.to_string(),
        })
    }

    /// Returns `true` if the parameter is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConnectionParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
