//! Error definitions shared across the router.
//!
//! # Design Decisions
//! - `DbError` is what a physical connection reports; routing hands it back
//!   to the caller untouched
//! - `ConfigError` only ever surfaces while a pool is being built
//! - Whether a failure was a connectivity problem is decided by asking the
//!   connection (`is_active`), not by trusting the error variant

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors reported by a single physical database connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// The server could not be reached or the session was lost.
    #[error("connection lost: {0}")]
    Connectivity(String),

    /// The server rejected the statement (syntax, constraint, permissions).
    #[error("statement failed: {0}")]
    Statement(String),
}

impl DbError {
    /// True for errors that point at the transport rather than the statement.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DbError::Connectivity(_))
    }
}

/// Result type for connection-level operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors raised while resolving configuration or building a pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation failed; every problem found is listed.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Neither the entry, its URL scheme, nor `pool_adapter` names an adapter.
    #[error("database configuration does not specify adapter")]
    AdapterNotSpecified,

    /// No connection factory is registered under this adapter name.
    #[error("database configuration specifies nonexistent {0} adapter")]
    AdapterNotFound(String),

    /// A pool member would itself be a replica pool.
    #[error("database pool must not be recursive")]
    RecursivePool,

    /// A weight was negative or not an integer.
    #[error("invalid pool weight {weight} for {role}")]
    InvalidWeight { role: String, weight: String },

    /// The same connection was supplied twice with different weights.
    #[error("connection {role} appears more than once with conflicting weights")]
    ConflictingWeight { role: String },

    /// A `url` entry could not be parsed.
    #[error("invalid url for {role}: {reason}")]
    InvalidUrl { role: String, reason: String },

    /// A member connection could not be established at startup.
    #[error("error connecting to {role}: {source}")]
    Connect {
        role: String,
        #[source]
        source: DbError,
    },
}

/// Result type for configuration and construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
