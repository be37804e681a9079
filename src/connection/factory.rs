//! Building physical connections from resolved configuration.
//!
//! # Responsibilities
//! - Map adapter names to driver factories
//! - Refuse to build a pool inside a pool
//! - Turn driver connect failures into fatal construction errors

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::adapter::POOL_ADAPTER_NAME;
use crate::connection::SubConnection;
use crate::error::{ConfigError, ConfigResult, DbResult};

/// One fully resolved connection entry (primary or replica).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionSpec {
    /// Pool role name (`"primary"`, `"replica_0"`, ...).
    pub role: String,
    /// Adapter used to open this connection.
    pub adapter: String,
    /// Share of pooled reads; 0 keeps the entry out of the read rotation.
    pub weight: u32,
    /// Every other setting (host, port, credentials, driver options).
    pub settings: toml::Table,
}

impl ConnectionSpec {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.settings.get(key).and_then(|v| v.as_integer())
    }

    pub fn is_primary(&self) -> bool {
        self.role == crate::adapter::PRIMARY_ROLE
    }
}

/// Opens connections for one adapter name.
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self, spec: &ConnectionSpec) -> DbResult<Arc<dyn SubConnection>>;
}

impl<F> ConnectionFactory for F
where
    F: Fn(&ConnectionSpec) -> DbResult<Arc<dyn SubConnection>> + Send + Sync,
{
    fn connect(&self, spec: &ConnectionSpec) -> DbResult<Arc<dyn SubConnection>> {
        self(spec)
    }
}

/// Adapter name → factory lookup used when building a pool from config.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, Box<dyn ConnectionFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `adapter`.
    pub fn register(&mut self, adapter: impl Into<String>, factory: impl ConnectionFactory + 'static) {
        self.factories.insert(adapter.into(), Box::new(factory));
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, adapter: impl Into<String>, factory: impl ConnectionFactory + 'static) -> Self {
        self.register(adapter, factory);
        self
    }

    pub fn contains(&self, adapter: &str) -> bool {
        self.factories.contains_key(adapter)
    }

    /// Open the connection described by `spec`.
    pub fn connect(&self, spec: &ConnectionSpec) -> ConfigResult<Arc<dyn SubConnection>> {
        if spec.adapter.is_empty() {
            return Err(ConfigError::AdapterNotSpecified);
        }
        if spec.adapter == POOL_ADAPTER_NAME {
            return Err(ConfigError::RecursivePool);
        }
        let factory = self
            .factories
            .get(&spec.adapter)
            .ok_or_else(|| ConfigError::AdapterNotFound(spec.adapter.clone()))?;

        factory.connect(spec).map_err(|source| {
            tracing::error!(role = %spec.role, adapter = %spec.adapter, error = %source, "Error connecting pool member");
            ConfigError::Connect {
                role: spec.role.clone(),
                source,
            }
        })
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adapters: Vec<_> = self.factories.keys().collect();
        adapters.sort();
        f.debug_struct("FactoryRegistry")
            .field("adapters", &adapters)
            .finish()
    }
}
