//! Connection role names for diagnostics.
//!
//! SQL instrumentation only sees the connection it runs on; this side map
//! turns its [`ConnectionId`] back into the pool role ("primary", "replica_0") so log lines say which
//! member ran a statement. Adapters insert their members on construction and
//! remove them on drop, so the map never outlives the pools it describes.

use std::sync::Arc;

use dashmap::DashMap;

use crate::connection::{ConnectionHandle, ConnectionId, SubConnection};

/// Statement name used by drivers for schema introspection queries.
const SCHEMA_STATEMENT: &str = "SCHEMA";

/// Thread-safe `ConnectionId → role name` map.
#[derive(Debug, Default, Clone)]
pub struct ConnectionNames {
    inner: Arc<DashMap<ConnectionId, Arc<str>>>,
}

impl ConnectionNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: &ConnectionHandle) {
        self.inner.insert(handle.id(), Arc::from(handle.role()));
    }

    pub fn unregister(&self, id: ConnectionId) {
        self.inner.remove(&id);
    }

    pub fn name(&self, id: ConnectionId) -> Option<String> {
        self.inner.get(&id).map(|entry| entry.value().to_string())
    }

    /// Role of `connection`, looked up from the connection itself.
    pub fn name_of(&self, connection: &dyn SubConnection) -> Option<String> {
        self.name(ConnectionId::of(connection))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Decorate a SQL log payload name with the pool role.
    ///
    /// Returns `None` for schema statements, which are not logged at all.
    pub fn annotate(&self, id: ConnectionId, statement_name: &str) -> Option<String> {
        if statement_name == SCHEMA_STATEMENT {
            return None;
        }
        match self.inner.get(&id) {
            Some(role) if statement_name.is_empty() => Some(role.value().to_string()),
            Some(role) => Some(format!("{} {}", role.value(), statement_name)),
            None => Some(statement_name.to_string()),
        }
    }
}
