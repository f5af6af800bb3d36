//! Adapter registry: maps a registration key to a factory for that adapter.
//!
//! Registration happens explicitly at composition time. Populating the table
//! is a startup invariant, so duplicate keys are rejected with an error
//! rather than silently overwritten.

use std::collections::HashMap;
use std::sync::Arc;

use legalspend_types::SourceConfig;

use crate::{SpendError, SpendSource};

/// Factory closure that builds an adapter from its configuration.
pub type SourceFactory =
    Arc<dyn Fn(&SourceConfig) -> Result<Arc<dyn SpendSource>, SpendError> + Send + Sync>;

/// Dispatch table from registration key to adapter factory.
///
/// Key policy: API sources register under their specific lowercase
/// integration name ("legaltracker", "brightflag", ...) since each remote
/// API needs its own adapter; database and file sources register under the
/// generic kind ("database", "file") since one adapter class serves every
/// configuration of that kind.
#[derive(Default)]
pub struct SourceRegistry {
    entries: HashMap<String, SourceFactory>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `key`.
    ///
    /// # Errors
    /// Returns a configuration error if `key` is already registered.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), SpendError>
    where
        F: Fn(&SourceConfig) -> Result<Arc<dyn SpendSource>, SpendError> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(SpendError::config(format!(
                "source key '{key}' is already registered"
            )));
        }
        self.entries.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Look up the factory for `key`.
    ///
    /// # Errors
    /// Returns a configuration error naming the unresolved key.
    pub fn factory_for(&self, key: &str) -> Result<&SourceFactory, SpendError> {
        self.entries
            .get(key)
            .ok_or_else(|| SpendError::config(format!("no data source registered for key '{key}'")))
    }

    /// Resolve a configuration to its factory and build the adapter.
    ///
    /// # Errors
    /// Returns a configuration error for an unresolved key or a failing
    /// constructor.
    pub fn build(&self, config: &SourceConfig) -> Result<Arc<dyn SpendSource>, SpendError> {
        let factory = self.factory_for(&config.registration_key())?;
        factory(config)
    }

    /// Registered keys, for diagnostics.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
