//! Weighted read rotation and replica selection.
//!
//! # Data Flow
//! ```text
//! (primary, replicas) with weights
//!     → weighted.rs (expand once into the weighted rotation, freeze)
//!     → health::suppression (trim out members that are currently dead)
//!     → ReplicaBalancer picks one entry of what is left:
//!         - random.rs (uniform over the weighted list, the default)
//!         - round_robin.rs (rotate through the weighted list)
//! ```
//!
//! # Design Decisions
//! - Weights are applied by repetition, so every balancer is weight-aware
//!   without knowing about weights
//! - The rotation is immutable after construction; no reweighting at runtime
//! - Balancers hold no per-member state and can be shared freely

pub mod random;
pub mod round_robin;
pub mod weighted;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionHandle;

pub use random::WeightedRandom;
pub use round_robin::RoundRobin;
pub use weighted::{PoolMember, WeightedPool};

/// Strategy for choosing one read connection from the available rotation.
pub trait ReplicaBalancer: Send + Sync + fmt::Debug {
    /// Pick one candidate, or `None` when there is nothing to pick from.
    fn pick(&self, candidates: &[ConnectionHandle]) -> Option<ConnectionHandle>;
}

/// Configurable choice of [`ReplicaBalancer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancerKind {
    #[default]
    Random,
    RoundRobin,
}

impl BalancerKind {
    pub fn build(self) -> Box<dyn ReplicaBalancer> {
        match self {
            BalancerKind::Random => Box::new(WeightedRandom::new()),
            BalancerKind::RoundRobin => Box::new(RoundRobin::new()),
        }
    }
}
