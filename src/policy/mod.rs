//! Read connection selection policy.
//!
//! # Data Flow
//! ```text
//! Caller owns a SelectionContext (one per request / unit of work)
//!     → use_* / within(..) set the policy, scoped or permanent
//!     → adapter asks context.resolve(adapter) for every pooled read:
//!         adapter forced to master → primary
//!         Master                   → primary
//!         Random                   → fresh weighted pick every call
//!         Persistent               → first pick cached per adapter
//! ```
//!
//! # Design Decisions
//! - The context is passed explicitly; there is no thread-local state
//! - Scopes restore the enclosing policy on every exit path, including
//!   panics, through a drop guard
//! - Sticky picks are keyed by adapter identity so one request can use
//!   several pools independently

pub mod context;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adapter::AdapterId;
use crate::connection::ConnectionHandle;

pub use context::{PolicyScope, SelectionContext};

/// How pooled reads pick a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Every read goes to the primary.
    #[default]
    Master,
    /// Every read picks a new weighted replica.
    Random,
    /// The first read picks a replica; later reads in scope reuse it.
    Persistent,
}

impl ReadPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPolicy::Master => "master",
            ReadPolicy::Random => "random",
            ReadPolicy::Persistent => "persistent",
        }
    }
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "master" | "primary" => Ok(ReadPolicy::Master),
            "random" => Ok(ReadPolicy::Random),
            "persistent" | "sticky" => Ok(ReadPolicy::Persistent),
            other => Err(format!("unknown read policy '{other}'")),
        }
    }
}

/// What a selection context needs from a pool to resolve a read connection.
pub trait ReadSource {
    /// Identity used to key sticky bindings.
    fn source_id(&self) -> AdapterId;

    /// True while the pool is forced onto its primary.
    fn using_master(&self) -> bool;

    /// Policy applied when the context has none of its own.
    fn default_policy(&self) -> ReadPolicy {
        ReadPolicy::Master
    }

    fn master_connection(&self) -> ConnectionHandle;

    /// A weighted pick from the currently available rotation.
    fn pick_weighted_replica(&self) -> ConnectionHandle;
}
