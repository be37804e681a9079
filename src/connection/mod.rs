//! Physical connection abstraction.
//!
//! # Data Flow
//! ```text
//! ConnectionSpec (resolved config entry)
//!     → factory.rs (adapter name → ConnectionFactory → Arc<dyn SubConnection>)
//!     → handle.rs (ConnectionHandle: identity + pool role)
//!     → names.rs (role registered for log annotation)
//! ```
//!
//! # Design Decisions
//! - A `SubConnection` already knows how to talk to exactly one database;
//!   nothing in this crate parses SQL or speaks a wire protocol
//! - Connections are compared by identity, never by configuration
//! - Methods take `&self`; drivers keep their own interior locking

pub mod factory;
pub mod handle;
pub mod names;

use serde::{Deserialize, Serialize};

use crate::error::DbResult;

pub use factory::{ConnectionFactory, ConnectionSpec, FactoryRegistry};
pub use handle::{ConnectionHandle, ConnectionId};
pub use names::ConnectionNames;

/// Bind parameter / cell value.
pub type Value = serde_json::Value;

/// A single result row.
pub type Row = Vec<Value>;

/// Rows returned by a query, with their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column metadata as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
}

/// One physical database connection.
///
/// Implemented by drivers outside this crate. The pool routes calls to the
/// right implementor and never looks inside.
pub trait SubConnection: Send + Sync {
    /// Name of the adapter that produced this connection (e.g. `"postgres"`).
    fn adapter_name(&self) -> &str;

    fn select(&self, sql: &str, binds: &[Value]) -> DbResult<ResultSet>;

    fn select_rows(&self, sql: &str, binds: &[Value]) -> DbResult<Vec<Row>> {
        self.select(sql, binds).map(|result| result.rows)
    }

    fn tables(&self) -> DbResult<Vec<String>>;

    fn columns(&self, table: &str) -> DbResult<Vec<Column>>;

    /// Run a statement without a result set; returns affected rows.
    fn execute(&self, sql: &str) -> DbResult<u64>;

    /// Returns the generated primary key, if the server reports one.
    fn insert(&self, sql: &str, binds: &[Value]) -> DbResult<Option<i64>>;

    fn update(&self, sql: &str, binds: &[Value]) -> DbResult<u64>;

    fn delete(&self, sql: &str, binds: &[Value]) -> DbResult<u64>;

    /// Cheap liveness check. Must not fail.
    fn is_active(&self) -> bool;

    fn reconnect(&self) -> DbResult<()>;

    fn disconnect(&self) -> DbResult<()>;

    /// Reset session state (temporary tables, session variables).
    fn reset(&self) -> DbResult<()> {
        Ok(())
    }

    /// Reconnect if the connection has gone away.
    fn verify(&self) -> DbResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            self.reconnect()
        }
    }

    /// Return accumulated query runtime (seconds) and zero the counter.
    fn reset_runtime(&self) -> f64 {
        0.0
    }

    fn begin_transaction(&self) -> DbResult<()>;

    fn commit_transaction(&self) -> DbResult<()>;

    fn rollback_transaction(&self) -> DbResult<()>;
}

#[cfg(test)]
pub(crate) mod testing;
