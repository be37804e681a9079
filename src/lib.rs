//! Replica-aware database connection router.
//!
//! One logical connection over a writable primary and weighted read
//! replicas. Writes go to the primary, reads are load-balanced under a
//! caller-selected policy, and a dead replica is taken out of rotation and
//! the read retried once instead of failing the request.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller + SelectionContext
//!            │
//!            ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ adapter::PoolAdapter                                     │
//!   │   routing (classify, dispatch, retry once)               │
//!   │      │ reads                     │ writes / fan-out      │
//!   │      ▼                           ▼                       │
//!   │   policy::SelectionContext    primary (master forced)    │
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │   health::SuppressionStack ── load_balancer::WeightedPool│
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │   ReplicaBalancer pick                                   │
//!   └──────┬───────────────────────────────────────────────────┘
//!          ▼
//!   connection::SubConnection (driver, outside this crate)
//! ```

pub mod adapter;
pub mod config;
pub mod connection;
pub mod error;
pub mod health;
pub mod load_balancer;
pub mod observability;
pub mod policy;
pub mod routing;

pub use adapter::{AdapterOptions, PoolAdapter, POOL_ADAPTER_NAME, PRIMARY_ROLE};
pub use config::RouterConfig;
pub use connection::{ConnectionFactory, ConnectionHandle, ConnectionSpec, FactoryRegistry, SubConnection};
pub use error::{ConfigError, DbError};
pub use policy::{ReadPolicy, SelectionContext};
pub use routing::{Operation, OperationKind};
