//! Round-robin selection over the weighted rotation.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::connection::ConnectionHandle;
use crate::load_balancer::ReplicaBalancer;

/// Round-robin selector.
/// Stores an internal counter to rotate through the candidates.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplicaBalancer for RoundRobin {
    fn pick(&self, candidates: &[ConnectionHandle]) -> Option<ConnectionHandle> {
        if candidates.is_empty() {
            return None;
        }

        // The candidate list shrinks and grows with suppression, so the
        // counter is reduced modulo the current length on every pick.
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Some(candidates[index].clone())
    }
}
