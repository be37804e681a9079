//! Per-request read cache.
//!
//! Lives in the caller's `SelectionContext`, so entries never leak between
//! requests and go away with the context. Each adapter keeps a write
//! generation; entries cached under an older generation are never served.

use std::collections::HashMap;

use crate::adapter::AdapterId;
use crate::connection::{ResultSet, Value};

#[derive(Debug, Clone, Default)]
struct CachedReads {
    generation: u64,
    entries: HashMap<String, ResultSet>,
}

/// Cached `select` results keyed by adapter, statement text and binds.
///
/// Disabled until [`enable`](Self::enable) is called.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    enabled: bool,
    adapters: HashMap<AdapterId, CachedReads>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Turn caching off and drop every entry.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            tracing::debug!(entries = self.len(), "Clearing query cache");
        }
        self.adapters.clear();
    }

    /// A hit only if it was stored under the adapter's current `generation`.
    pub fn get(&self, adapter: AdapterId, generation: u64, sql: &str, binds: &[Value]) -> Option<ResultSet> {
        if !self.enabled {
            return None;
        }
        self.adapters
            .get(&adapter)
            .filter(|cached| cached.generation == generation)
            .and_then(|cached| cached.entries.get(&cache_key(sql, binds)))
            .cloned()
    }

    pub fn store(&mut self, adapter: AdapterId, generation: u64, sql: &str, binds: &[Value], result: &ResultSet) {
        if !self.enabled {
            return;
        }
        let cached = self.adapters.entry(adapter).or_default();
        if cached.generation != generation {
            cached.entries.clear();
            cached.generation = generation;
        }
        cached.entries.insert(cache_key(sql, binds), result.clone());
    }

    pub fn len(&self) -> usize {
        self.adapters.values().map(|cached| cached.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(sql: &str, binds: &[Value]) -> String {
    format!("{sql}\u{0}{}", Value::Array(binds.to_vec()))
}
