//! Read-pool health: temporary exclusion of dead members.
//!
//! # Data Flow
//! ```text
//! Read fails and the connection reports itself inactive:
//!     → suppression.rs: push {rotation minus member, expires_at}
//!
//! Next lookup of the available rotation:
//!     top snapshot still live  → use it
//!     top snapshot expired     → claim it under the lock (deadline moves on)
//!         → reconnect the excluded member with the lock released
//!         → re-lock: success pops it, failure sets a new deadline
//! ```
//!
//! # Design Decisions
//! - Expiry is checked lazily on access; there is no timer or background task
//! - Only the top snapshot is ever consulted; older exclusions wait underneath
//! - Excluding the last usable member resets to the full rotation instead of
//!   leaving reads with nowhere to go
//! - Reinstatement failures never escape; they only postpone the next attempt
//! - No connection call runs under the lock; readers bound for healthy
//!   members never wait on a reconnect

pub mod suppression;

pub use suppression::{AvailabilitySnapshot, Reinstatement, SharedSuppression, SuppressOutcome, SuppressionStack};
