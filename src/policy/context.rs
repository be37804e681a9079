//! Request-scoped selection state.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::adapter::{AdapterId, QueryCache};
use crate::connection::ConnectionHandle;
use crate::policy::{ReadPolicy, ReadSource};

#[derive(Debug, Clone)]
enum Selection {
    Master,
    Random,
    Sticky(HashMap<AdapterId, ConnectionHandle>),
}

impl Selection {
    fn fresh(policy: ReadPolicy) -> Self {
        match policy {
            ReadPolicy::Master => Selection::Master,
            ReadPolicy::Random => Selection::Random,
            ReadPolicy::Persistent => Selection::Sticky(HashMap::new()),
        }
    }

    fn policy(&self) -> ReadPolicy {
        match self {
            Selection::Master => ReadPolicy::Master,
            Selection::Random => ReadPolicy::Random,
            Selection::Sticky(_) => ReadPolicy::Persistent,
        }
    }
}

/// Read policy, sticky bindings and query cache for one logical request.
///
/// Not shared between requests. A fresh context has no explicit policy and
/// behaves as [`ReadPolicy::Master`]; its query cache starts disabled.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    selection: Option<Selection>,
    query_cache: QueryCache,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with `policy` already set.
    pub fn from_policy(policy: ReadPolicy) -> Self {
        Self {
            selection: Some(Selection::fresh(policy)),
            query_cache: QueryCache::new(),
        }
    }

    /// Effective policy, `Master` when none was set.
    pub fn current_policy(&self) -> ReadPolicy {
        self.policy_or(ReadPolicy::Master)
    }

    pub fn policy_or(&self, default: ReadPolicy) -> ReadPolicy {
        self.explicit_policy().unwrap_or(default)
    }

    /// The policy set on this context, if any.
    pub fn explicit_policy(&self) -> Option<ReadPolicy> {
        self.selection.as_ref().map(Selection::policy)
    }

    /// Set `policy` until changed again. `Persistent` starts with no bindings.
    pub fn set_policy(&mut self, policy: ReadPolicy) {
        self.selection = Some(Selection::fresh(policy));
    }

    pub fn use_master(&mut self) {
        self.set_policy(ReadPolicy::Master);
    }

    pub fn use_random(&mut self) {
        self.set_policy(ReadPolicy::Random);
    }

    pub fn use_persistent(&mut self) {
        self.set_policy(ReadPolicy::Persistent);
    }

    /// Forget the policy and every sticky binding.
    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Cache `select` results for the rest of this request.
    pub fn enable_query_cache(&mut self) {
        self.query_cache.enable();
    }

    pub fn disable_query_cache(&mut self) {
        self.query_cache.disable();
    }

    pub fn query_cache(&self) -> &QueryCache {
        &self.query_cache
    }

    pub(crate) fn query_cache_mut(&mut self) -> &mut QueryCache {
        &mut self.query_cache
    }

    /// Switch to `policy` until the returned guard is dropped.
    pub fn scoped(&mut self, policy: ReadPolicy) -> PolicyScope<'_> {
        let saved = self.selection.replace(Selection::fresh(policy));
        PolicyScope {
            cx: self,
            saved: Some(saved),
        }
    }

    /// Run `f` under `policy`, restoring the enclosing policy afterwards.
    pub fn within<T>(&mut self, policy: ReadPolicy, f: impl FnOnce(&mut SelectionContext) -> T) -> T {
        let mut scope = self.scoped(policy);
        f(&mut scope)
    }

    pub fn with_master<T>(&mut self, f: impl FnOnce(&mut SelectionContext) -> T) -> T {
        self.within(ReadPolicy::Master, f)
    }

    pub fn with_random<T>(&mut self, f: impl FnOnce(&mut SelectionContext) -> T) -> T {
        self.within(ReadPolicy::Random, f)
    }

    pub fn with_persistent<T>(&mut self, f: impl FnOnce(&mut SelectionContext) -> T) -> T {
        self.within(ReadPolicy::Persistent, f)
    }

    /// Pick the connection a pooled read against `source` should use.
    ///
    /// A context without a policy adopts the source's default on first use.
    pub fn resolve<S: ReadSource + ?Sized>(&mut self, source: &S) -> ConnectionHandle {
        if source.using_master() {
            return source.master_connection();
        }
        if self.selection.is_none() {
            match source.default_policy() {
                ReadPolicy::Master => return source.master_connection(),
                policy => self.selection = Some(Selection::fresh(policy)),
            }
        }
        match &mut self.selection {
            None | Some(Selection::Master) => source.master_connection(),
            Some(Selection::Random) => source.pick_weighted_replica(),
            Some(Selection::Sticky(bindings)) => bindings
                .entry(source.source_id())
                .or_insert_with(|| source.pick_weighted_replica())
                .clone(),
        }
    }

    /// Replace (or with `None`, drop) the sticky binding for one adapter.
    ///
    /// No-op unless the current policy is `Persistent`.
    pub fn set_persistent_binding(&mut self, adapter: AdapterId, connection: Option<ConnectionHandle>) {
        if let Some(Selection::Sticky(bindings)) = &mut self.selection {
            match connection {
                Some(connection) => {
                    bindings.insert(adapter, connection);
                }
                None => {
                    bindings.remove(&adapter);
                }
            }
        }
    }

    pub fn persistent_binding(&self, adapter: AdapterId) -> Option<&ConnectionHandle> {
        match &self.selection {
            Some(Selection::Sticky(bindings)) => bindings.get(&adapter),
            _ => None,
        }
    }
}

/// Guard returned by [`SelectionContext::scoped`]; restores on drop.
pub struct PolicyScope<'a> {
    cx: &'a mut SelectionContext,
    saved: Option<Option<Selection>>,
}

impl Deref for PolicyScope<'_> {
    type Target = SelectionContext;

    fn deref(&self) -> &Self::Target {
        self.cx
    }
}

impl DerefMut for PolicyScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cx
    }
}

impl Drop for PolicyScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.cx.selection = saved;
        }
    }
}
