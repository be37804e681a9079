//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing, suppression and fan-out produce:
//!     → tracing events (structured, one per decision worth reading later)
//!     → metrics.rs (counters and gauges through the `metrics` facade)
//!
//! Hosts provide:
//!     → a tracing subscriber (logging.rs installs a default one)
//!     → a metrics recorder/exporter of their choice
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics exporter; without a recorder the
//!   facade calls are no-ops
//! - Connections are labelled by pool role, never by host or credentials
//! - Logging setup is idempotent so tests and hosts can both call it

pub mod logging;
pub mod metrics;
