//! Random selection over the weighted rotation.

use rand::Rng;

use crate::connection::ConnectionHandle;
use crate::load_balancer::ReplicaBalancer;

/// Uniform pick over the (weight-expanded) candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRandom;

impl WeightedRandom {
    pub fn new() -> Self {
        Self
    }
}

impl ReplicaBalancer for WeightedRandom {
    fn pick(&self, candidates: &[ConnectionHandle]) -> Option<ConnectionHandle> {
        if candidates.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..candidates.len());
        Some(candidates[index].clone())
    }
}
