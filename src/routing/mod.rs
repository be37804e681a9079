//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! PoolAdapter entry point (select, insert, reconnect, ...)
//!     → operation.rs (static classification by operation name)
//!     → router.rs dispatch by kind:
//!         ReadOnly               → policy-resolved connection, one retry
//!         Write                  → primary, master forced for the call
//!         CacheInvalidatingWrite → clear query cache, then as Write
//!         FanOutAll / Aggregate  → every member; only the primary may fail
//!         FanOutAny              → primary under Master, else any member
//! ```
//!
//! # Design Decisions
//! - Classification is per operation name, never per call
//! - Unrecognised operations are treated as writes
//! - Only the read path retries, and at most once per call
//! - Liveness is asked of the failed connection; error variants are not
//!   trusted to say whether the server went away

pub mod operation;
pub mod router;

pub use operation::{Operation, OperationKind};
