//! Weighted pool membership.
//!
//! # Responsibilities
//! - Hold the primary and replica connections of one pool
//! - Expand weights into the read rotation exactly once
//! - Answer membership and weight queries without locking
//!
//! # Design Decisions
//! - The primary joins the rotation only when its own weight is non-zero
//! - Weight-0 replicas stay members (fan-out reaches them) but never serve
//!   pooled reads
//! - Supplying the same physical connection twice is accepted only when the
//!   weights agree; it is then counted once

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::connection::handle::same_connection;
use crate::connection::{ConnectionHandle, ConnectionId, SubConnection};
use crate::error::{ConfigError, ConfigResult};

/// A connection offered to the pool together with its read weight.
#[derive(Clone)]
pub struct PoolMember {
    pub role: String,
    pub connection: Arc<dyn SubConnection>,
    pub weight: i64,
}

impl PoolMember {
    pub fn new(role: impl Into<String>, connection: Arc<dyn SubConnection>, weight: i64) -> Self {
        Self {
            role: role.into(),
            connection,
            weight,
        }
    }
}

impl fmt::Debug for PoolMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolMember")
            .field("role", &self.role)
            .field("adapter", &self.connection.adapter_name())
            .field("weight", &self.weight)
            .finish()
    }
}

/// Immutable primary + replicas membership with the precomputed rotation.
#[derive(Debug, Clone)]
pub struct WeightedPool {
    primary: ConnectionHandle,
    replicas: Vec<ConnectionHandle>,
    weights: HashMap<ConnectionId, u32>,
    expanded: Vec<ConnectionHandle>,
}

impl WeightedPool {
    /// Build the pool, validating weights and identities.
    pub fn new(primary: PoolMember, replicas: Vec<PoolMember>) -> ConfigResult<Self> {
        let primary_weight = checked_weight(&primary)?;
        let primary_handle = ConnectionHandle::new(primary.role.as_str(), primary.connection);

        let mut entries: Vec<(ConnectionHandle, u32)> = vec![(primary_handle.clone(), primary_weight)];
        let mut replica_handles = Vec::with_capacity(replicas.len());

        for member in replicas {
            let weight = checked_weight(&member)?;

            if let Some((_, existing)) = entries.iter().find(|(h, _)| h.wraps(&member.connection)) {
                if *existing != weight {
                    return Err(ConfigError::ConflictingWeight { role: member.role });
                }
                tracing::debug!(role = %member.role, "Ignoring duplicate pool member");
                continue;
            }

            let handle = ConnectionHandle::new(member.role.as_str(), member.connection);
            entries.push((handle.clone(), weight));
            replica_handles.push(handle);
        }

        let mut expanded = Vec::new();
        let mut weights = HashMap::with_capacity(entries.len());
        for (handle, weight) in entries {
            for _ in 0..weight {
                expanded.push(handle.clone());
            }
            weights.insert(handle.id(), weight);
        }

        Ok(Self {
            primary: primary_handle,
            replicas: replica_handles,
            weights,
            expanded,
        })
    }

    pub fn primary(&self) -> &ConnectionHandle {
        &self.primary
    }

    pub fn replicas(&self) -> &[ConnectionHandle] {
        &self.replicas
    }

    /// Primary followed by every replica, in configuration order.
    pub fn members(&self) -> Vec<ConnectionHandle> {
        std::iter::once(self.primary.clone())
            .chain(self.replicas.iter().cloned())
            .collect()
    }

    /// The read rotation: each member repeated `weight` times.
    pub fn expanded(&self) -> &[ConnectionHandle] {
        &self.expanded
    }

    /// Number of occurrences of `connection` in the rotation.
    pub fn weight_of(&self, connection: &ConnectionHandle) -> u32 {
        self.weights.get(&connection.id()).copied().unwrap_or(0)
    }

    pub fn contains(&self, connection: &ConnectionHandle) -> bool {
        self.weights.contains_key(&connection.id())
    }

    /// Find the member wrapping this physical connection.
    pub fn find(&self, connection: &Arc<dyn SubConnection>) -> Option<&ConnectionHandle> {
        std::iter::once(&self.primary)
            .chain(self.replicas.iter())
            .find(|h| same_connection(h.connection(), connection))
    }

    pub fn len(&self) -> usize {
        1 + self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

fn checked_weight(member: &PoolMember) -> ConfigResult<u32> {
    u32::try_from(member.weight).map_err(|_| ConfigError::InvalidWeight {
        role: member.role.clone(),
        weight: member.weight.to_string(),
    })
}
