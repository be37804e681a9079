//! Operation names and their routing classes.

use std::fmt;
use std::str::FromStr;

/// How an operation is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Primary only, master forced for the call.
    Write,
    /// Like `Write`, and the query cache is cleared first.
    CacheInvalidatingWrite,
    /// Policy-resolved connection, with one retry on failure.
    ReadOnly,
    /// Every connection; replica failures are swallowed.
    FanOutAll,
    /// Primary under the Master policy, otherwise any connection.
    FanOutAny,
    /// Every connection, results combined.
    Aggregate,
}

impl OperationKind {
    pub fn clears_query_cache(&self) -> bool {
        matches!(self, OperationKind::CacheInvalidatingWrite)
    }

    pub fn is_write(&self) -> bool {
        matches!(self, OperationKind::Write | OperationKind::CacheInvalidatingWrite)
    }
}

/// A pool operation, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    SelectRows,
    Tables,
    Columns,
    Insert,
    Update,
    Delete,
    Execute,
    RawConnection,
    BeginTransaction,
    CommitTransaction,
    RollbackTransaction,
    Reconnect,
    Disconnect,
    Reset,
    Active,
    Verify,
    ResetRuntime,
    /// Anything else a driver exposes. Routed as a write.
    Other(String),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Select | Operation::SelectRows | Operation::Tables | Operation::Columns => {
                OperationKind::ReadOnly
            }
            Operation::Insert
            | Operation::Update
            | Operation::Delete
            | Operation::Execute
            | Operation::RawConnection => OperationKind::CacheInvalidatingWrite,
            Operation::Reconnect | Operation::Disconnect | Operation::Reset => OperationKind::FanOutAll,
            Operation::Active | Operation::Verify => OperationKind::FanOutAny,
            Operation::ResetRuntime => OperationKind::Aggregate,
            Operation::BeginTransaction
            | Operation::CommitTransaction
            | Operation::RollbackTransaction
            | Operation::Other(_) => OperationKind::Write,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Operation::Select => "select",
            Operation::SelectRows => "select_rows",
            Operation::Tables => "tables",
            Operation::Columns => "columns",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Execute => "execute",
            Operation::RawConnection => "with_raw_connection",
            Operation::BeginTransaction => "begin_transaction",
            Operation::CommitTransaction => "commit_transaction",
            Operation::RollbackTransaction => "rollback_transaction",
            Operation::Reconnect => "reconnect",
            Operation::Disconnect => "disconnect",
            Operation::Reset => "reset",
            Operation::Active => "active",
            Operation::Verify => "verify",
            Operation::ResetRuntime => "reset_runtime",
            Operation::Other(name) => name,
        }
    }

    /// Look an operation up by name; unknown names become [`Operation::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "select" => Operation::Select,
            "select_rows" => Operation::SelectRows,
            "tables" => Operation::Tables,
            "columns" => Operation::Columns,
            "insert" => Operation::Insert,
            "update" => Operation::Update,
            "delete" => Operation::Delete,
            "execute" => Operation::Execute,
            "with_raw_connection" | "raw_connection" => Operation::RawConnection,
            "begin_transaction" | "begin_db_transaction" => Operation::BeginTransaction,
            "commit_transaction" | "commit_db_transaction" => Operation::CommitTransaction,
            "rollback_transaction" | "rollback_db_transaction" => Operation::RollbackTransaction,
            "reconnect" | "reconnect!" => Operation::Reconnect,
            "disconnect" | "disconnect!" => Operation::Disconnect,
            "reset" | "reset!" => Operation::Reset,
            "active" | "active?" => Operation::Active,
            "verify" | "verify!" => Operation::Verify,
            "reset_runtime" => Operation::ResetRuntime,
            other => Operation::Other(other.to_string()),
        }
    }
}

impl FromStr for Operation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Operation::from_name(s))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
