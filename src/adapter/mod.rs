//! The pool facade the data layer talks to.
//!
//! # Data Flow
//! ```text
//! RouterConfig + FactoryRegistry
//!     → config::resolver (primary spec, replica specs)
//!     → FactoryRegistry::connect for each spec
//!     → WeightedPool (membership, weighted rotation)
//!     → SharedSuppression seeded with the rotation
//!     → PoolAdapter
//!
//! PoolAdapter::select(cx, ..)     → routing::router::route_read
//! PoolAdapter::insert(..)         → routing::router::route_write
//! PoolAdapter::reconnect()        → fan_out.rs
//! ```
//!
//! # Design Decisions
//! - One adapter is shared by every caller in the process; the
//!   suppression stack sits behind a mutex that is never held across
//!   connection I/O, forced-master is an atomic depth
//! - The query cache belongs to the caller's context; the adapter only
//!   bumps a write generation that makes older entries unusable
//! - Policy state is not stored here; every pooled read takes the caller's
//!   `SelectionContext`
//! - Member role names are registered on construction and removed on drop

pub mod fan_out;
pub mod query_cache;

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::config::{resolve_pool, ResolvedPool, RouterConfig};
use crate::connection::{
    Column, ConnectionHandle, ConnectionNames, ConnectionSpec, FactoryRegistry, ResultSet, Row, SubConnection,
    Value,
};
use crate::error::{ConfigError, ConfigResult, DbError, DbResult};
use crate::health::suppression::{DEFAULT_COOLDOWN, DEFAULT_RETRY_DELAY};
use crate::health::{SharedSuppression, SuppressOutcome, SuppressionStack};
use crate::load_balancer::{PoolMember, ReplicaBalancer, WeightedPool, WeightedRandom};
use crate::policy::{ReadPolicy, ReadSource, SelectionContext};
use crate::routing::Operation;

pub use query_cache::QueryCache;

/// Adapter name of the pool itself. A member may never use it.
pub const POOL_ADAPTER_NAME: &str = "replica_pool";

/// Role name of the writable connection.
pub const PRIMARY_ROLE: &str = "primary";

static NEXT_ADAPTER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterId(u64);

impl AdapterId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ADAPTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Tunables for [`PoolAdapter`].
#[derive(Debug)]
pub struct AdapterOptions {
    pub cooldown: Duration,
    pub retry_delay: Duration,
    pub default_policy: ReadPolicy,
    pub balancer: Box<dyn ReplicaBalancer>,
    pub names: ConnectionNames,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            retry_delay: DEFAULT_RETRY_DELAY,
            default_policy: ReadPolicy::Master,
            balancer: Box::new(WeightedRandom::new()),
            names: ConnectionNames::new(),
        }
    }
}

impl AdapterOptions {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_default_policy(mut self, policy: ReadPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_balancer(mut self, balancer: impl ReplicaBalancer + 'static) -> Self {
        self.balancer = Box::new(balancer);
        self
    }

    /// Share a name registry with the host's SQL instrumentation.
    pub fn with_names(mut self, names: ConnectionNames) -> Self {
        self.names = names;
        self
    }
}

impl From<&RouterConfig> for AdapterOptions {
    fn from(config: &RouterConfig) -> Self {
        Self {
            cooldown: config.suppression.cooldown(),
            retry_delay: config.suppression.retry_delay(),
            default_policy: config.routing.default_policy,
            balancer: config.routing.balancer.build(),
            names: ConnectionNames::new(),
        }
    }
}

/// One logical connection over a primary and its read replicas.
pub struct PoolAdapter {
    id: AdapterId,
    pool: WeightedPool,
    suppression: SharedSuppression,
    forced_master: AtomicUsize,
    balancer: Box<dyn ReplicaBalancer>,
    cooldown: Duration,
    default_policy: ReadPolicy,
    names: ConnectionNames,
    write_generation: AtomicU64,
}

impl PoolAdapter {
    /// Build an adapter over already-open connections.
    pub fn new(primary: PoolMember, replicas: Vec<PoolMember>, options: AdapterOptions) -> ConfigResult<Self> {
        if std::iter::once(&primary)
            .chain(replicas.iter())
            .any(|member| member.connection.adapter_name() == POOL_ADAPTER_NAME)
        {
            return Err(ConfigError::RecursivePool);
        }

        let pool = WeightedPool::new(primary, replicas)?;
        let suppression = SuppressionStack::new(pool.expanded().to_vec(), options.retry_delay);
        for member in pool.members() {
            options.names.register(&member);
        }

        let adapter = Self {
            id: AdapterId::next(),
            pool,
            suppression: SharedSuppression::new(suppression),
            forced_master: AtomicUsize::new(0),
            balancer: options.balancer,
            cooldown: options.cooldown,
            default_policy: options.default_policy,
            names: options.names,
            write_generation: AtomicU64::new(0),
        };
        tracing::info!(
            adapter = %adapter.id,
            primary = %adapter.pool.primary().adapter_name(),
            replicas = adapter.pool.replicas().len(),
            rotation = adapter.pool.expanded().len(),
            balancer = ?adapter.balancer,
            "Replica pool ready"
        );
        Ok(adapter)
    }

    /// Resolve `config`, open every member through `registry` and build the pool.
    pub fn from_config(config: &RouterConfig, registry: &FactoryRegistry) -> ConfigResult<Self> {
        let resolved = resolve_pool(&config.pool)?;
        Self::from_resolved(&resolved, registry, AdapterOptions::from(config))
    }

    pub fn from_resolved(
        resolved: &ResolvedPool,
        registry: &FactoryRegistry,
        options: AdapterOptions,
    ) -> ConfigResult<Self> {
        let open = |spec: &ConnectionSpec| -> ConfigResult<PoolMember> {
            let connection = registry.connect(spec)?;
            Ok(PoolMember::new(spec.role.as_str(), connection, i64::from(spec.weight)))
        };

        let primary = open(&resolved.primary)?;
        let replicas = resolved
            .replicas
            .iter()
            .map(open)
            .collect::<ConfigResult<Vec<_>>>()?;
        Self::new(primary, replicas, options)
    }

    pub fn id(&self) -> AdapterId {
        self.id
    }

    pub fn adapter_name(&self) -> &'static str {
        POOL_ADAPTER_NAME
    }

    pub fn primary(&self) -> &ConnectionHandle {
        self.pool.primary()
    }

    pub fn replicas(&self) -> &[ConnectionHandle] {
        self.pool.replicas()
    }

    /// Primary followed by every replica.
    pub fn all_connections(&self) -> Vec<ConnectionHandle> {
        self.pool.members()
    }

    /// Occurrences of `connection` in the read rotation.
    pub fn weight_of(&self, connection: &ConnectionHandle) -> u32 {
        self.pool.weight_of(connection)
    }

    pub fn default_policy(&self) -> ReadPolicy {
        self.default_policy
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn names(&self) -> &ConnectionNames {
        &self.names
    }

    /// The weighted rotation usable right now, after lazy reinstatement.
    pub fn available_read_connections(&self) -> Vec<ConnectionHandle> {
        self.suppression.available()
    }

    /// Take `connection` out of the read rotation for `duration`.
    pub fn suppress_read_connection(&self, connection: &ConnectionHandle, duration: Duration) -> SuppressOutcome {
        self.suppression.suppress(connection, duration)
    }

    /// A balancer pick from the available rotation.
    ///
    /// Falls back to the primary when master is forced or nothing is available.
    pub fn pick_weighted_replica(&self) -> ConnectionHandle {
        if self.using_master() {
            return self.pool.primary().clone();
        }
        self.suppression
            .with_available(Instant::now(), |available| self.balancer.pick(available))
            .unwrap_or_else(|| self.pool.primary().clone())
    }

    pub fn using_master(&self) -> bool {
        self.forced_master.load(Ordering::Acquire) > 0
    }

    /// Force every read through the primary until the guard drops.
    pub fn force_master(&self) -> MasterGuard<'_> {
        self.forced_master.fetch_add(1, Ordering::AcqRel);
        MasterGuard {
            depth: &self.forced_master,
        }
    }

    pub fn with_forced_master<T>(&self, f: impl FnOnce() -> T) -> T {
        let _master = self.force_master();
        f()
    }

    /// Bumped by every cache-invalidating write.
    pub fn write_generation(&self) -> u64 {
        self.write_generation.load(Ordering::Acquire)
    }

    /// Make every context's cached reads for this adapter unusable.
    pub(crate) fn invalidate_query_caches(&self) {
        self.write_generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Run a `select`, through the context's query cache when it is enabled.
    ///
    /// With master forced (transactions, reloads) the cache is bypassed.
    pub fn select(&self, cx: &mut SelectionContext, sql: &str, binds: &[Value]) -> DbResult<ResultSet> {
        if self.using_master() {
            return self.route_read(cx, &Operation::Select, |c| c.select(sql, binds));
        }
        let generation = self.write_generation();
        if let Some(hit) = cx.query_cache().get(self.id, generation, sql, binds) {
            tracing::trace!(sql, "Query cache hit");
            return Ok(hit);
        }
        let result = self.route_read(cx, &Operation::Select, |c| c.select(sql, binds))?;
        cx.query_cache_mut().store(self.id, generation, sql, binds, &result);
        Ok(result)
    }

    pub fn select_rows(&self, cx: &mut SelectionContext, sql: &str, binds: &[Value]) -> DbResult<Vec<Row>> {
        self.route_read(cx, &Operation::SelectRows, |c| c.select_rows(sql, binds))
    }

    pub fn tables(&self, cx: &mut SelectionContext) -> DbResult<Vec<String>> {
        self.route_read(cx, &Operation::Tables, |c| c.tables())
    }

    pub fn columns(&self, cx: &mut SelectionContext, table: &str) -> DbResult<Vec<Column>> {
        self.route_read(cx, &Operation::Columns, |c| c.columns(table))
    }

    pub fn insert(&self, sql: &str, binds: &[Value]) -> DbResult<Option<i64>> {
        self.route_write(&Operation::Insert, |c| c.insert(sql, binds))
    }

    pub fn update(&self, sql: &str, binds: &[Value]) -> DbResult<u64> {
        self.route_write(&Operation::Update, |c| c.update(sql, binds))
    }

    pub fn delete(&self, sql: &str, binds: &[Value]) -> DbResult<u64> {
        self.route_write(&Operation::Delete, |c| c.delete(sql, binds))
    }

    pub fn execute(&self, sql: &str) -> DbResult<u64> {
        self.route_write(&Operation::Execute, |c| c.execute(sql))
    }

    /// Hand the primary to `f` with master forced.
    pub fn with_raw_connection<T>(&self, f: impl FnOnce(&dyn SubConnection) -> DbResult<T>) -> DbResult<T> {
        self.route_write(&Operation::RawConnection, f)
    }

    /// Run `f` inside a primary transaction; every read in it hits the primary.
    ///
    /// Commits on `Ok`, rolls back on `Err`. A failed rollback is logged and
    /// the closure's error is returned.
    pub fn transaction<T, E>(
        &self,
        cx: &mut SelectionContext,
        f: impl FnOnce(&mut SelectionContext) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let _master = self.force_master();
        self.route_write(&Operation::BeginTransaction, |c| c.begin_transaction())?;

        match f(cx) {
            Ok(value) => {
                self.route_write(&Operation::CommitTransaction, |c| c.commit_transaction())?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.route_write(&Operation::RollbackTransaction, |c| c.rollback_transaction()) {
                    tracing::error!(adapter = %self.id, error = %rollback, "Transaction rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Re-read a record from the primary.
    pub fn reload<T>(&self, cx: &mut SelectionContext, f: impl FnOnce(&mut SelectionContext) -> T) -> T {
        let _master = self.force_master();
        f(cx)
    }

}

impl ReadSource for PoolAdapter {
    fn source_id(&self) -> AdapterId {
        self.id
    }

    fn using_master(&self) -> bool {
        PoolAdapter::using_master(self)
    }

    fn default_policy(&self) -> ReadPolicy {
        self.default_policy
    }

    fn master_connection(&self) -> ConnectionHandle {
        self.pool.primary().clone()
    }

    fn pick_weighted_replica(&self) -> ConnectionHandle {
        PoolAdapter::pick_weighted_replica(self)
    }
}

/// Guard returned by [`PoolAdapter::force_master`].
pub struct MasterGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for MasterGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Display for PoolAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} {} connections>", POOL_ADAPTER_NAME, self.pool.len())
    }
}

impl fmt::Debug for PoolAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Drop for PoolAdapter {
    fn drop(&mut self) {
        for member in self.pool.members() {
            self.names.unregister(member.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::StubConnection;
    use crate::load_balancer::RoundRobin;
    use std::sync::Arc;

    struct Fixture {
        primary: Arc<StubConnection>,
        replicas: Vec<Arc<StubConnection>>,
        adapter: PoolAdapter,
    }

    fn fixture(primary_weight: i64, replica_weights: &[i64]) -> Fixture {
        let primary = StubConnection::shared("primary");
        let replicas: Vec<_> = (0..replica_weights.len())
            .map(|i| StubConnection::shared(&format!("replica_{i}")))
            .collect();
        let members = replicas
            .iter()
            .zip(replica_weights)
            .enumerate()
            .map(|(i, (conn, weight))| PoolMember::new(format!("replica_{i}"), conn.clone(), *weight))
            .collect();
        let adapter = PoolAdapter::new(
            PoolMember::new(PRIMARY_ROLE, primary.clone(), primary_weight),
            members,
            AdapterOptions::default().with_balancer(RoundRobin::new()),
        )
        .unwrap();
        Fixture {
            primary,
            replicas,
            adapter,
        }
    }

    fn source(result: DbResult<ResultSet>) -> String {
        result.unwrap().rows[0][0].as_str().unwrap().to_string()
    }

    #[test]
    fn test_membership_and_weights() {
        let f = fixture(1, &[1, 2]);
        let all = f.adapter.all_connections();
        assert_eq!(all.len(), 3);
        assert_eq!(f.adapter.weight_of(&all[0]), 1);
        assert_eq!(f.adapter.weight_of(&all[1]), 1);
        assert_eq!(f.adapter.weight_of(&all[2]), 2);
        assert_eq!(f.adapter.available_read_connections().len(), 4);
        assert_eq!(f.adapter.to_string(), "#<replica_pool 3 connections>");
        assert_eq!(format!("{:?}", f.adapter), "#<replica_pool 3 connections>");
    }

    #[test]
    fn test_recursive_member_rejected() {
        struct Nested;
        impl SubConnection for Nested {
            fn adapter_name(&self) -> &str {
                POOL_ADAPTER_NAME
            }
            fn select(&self, _: &str, _: &[Value]) -> DbResult<ResultSet> {
                Ok(ResultSet::default())
            }
            fn tables(&self) -> DbResult<Vec<String>> {
                Ok(Vec::new())
            }
            fn columns(&self, _: &str) -> DbResult<Vec<Column>> {
                Ok(Vec::new())
            }
            fn execute(&self, _: &str) -> DbResult<u64> {
                Ok(0)
            }
            fn insert(&self, _: &str, _: &[Value]) -> DbResult<Option<i64>> {
                Ok(None)
            }
            fn update(&self, _: &str, _: &[Value]) -> DbResult<u64> {
                Ok(0)
            }
            fn delete(&self, _: &str, _: &[Value]) -> DbResult<u64> {
                Ok(0)
            }
            fn is_active(&self) -> bool {
                true
            }
            fn reconnect(&self) -> DbResult<()> {
                Ok(())
            }
            fn disconnect(&self) -> DbResult<()> {
                Ok(())
            }
            fn begin_transaction(&self) -> DbResult<()> {
                Ok(())
            }
            fn commit_transaction(&self) -> DbResult<()> {
                Ok(())
            }
            fn rollback_transaction(&self) -> DbResult<()> {
                Ok(())
            }
        }

        let err = PoolAdapter::new(
            PoolMember::new(PRIMARY_ROLE, Arc::new(Nested), 1),
            Vec::new(),
            AdapterOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::RecursivePool));
    }

    #[test]
    fn test_reads_follow_policy() {
        let f = fixture(0, &[1, 1]);
        let mut cx = SelectionContext::new();

        assert_eq!(source(f.adapter.select(&mut cx, "SELECT 1", &[])), "primary");

        cx.use_random();
        let first = source(f.adapter.select(&mut cx, "SELECT 1", &[]));
        let second = source(f.adapter.select(&mut cx, "SELECT 1", &[]));
        assert_ne!(first, second);

        cx.use_persistent();
        let sticky = source(f.adapter.select(&mut cx, "SELECT 1", &[]));
        for _ in 0..4 {
            assert_eq!(source(f.adapter.select(&mut cx, "SELECT 1", &[])), sticky);
        }
    }

    #[test]
    fn test_writes_go_to_primary_and_invalidate_cache() {
        let f = fixture(0, &[1]);
        let mut cx = SelectionContext::from_policy(ReadPolicy::Random);
        cx.enable_query_cache();

        f.adapter.select(&mut cx, "SELECT * FROM users", &[]).unwrap();
        f.adapter.select(&mut cx, "SELECT * FROM users", &[]).unwrap();
        assert_eq!(f.replicas[0].calls(), vec!["select SELECT * FROM users"]);
        assert_eq!(cx.query_cache().len(), 1);

        assert_eq!(f.adapter.insert("INSERT INTO users VALUES (1)", &[]).unwrap(), Some(1));
        assert_eq!(f.adapter.write_generation(), 1);
        assert_eq!(f.primary.calls(), vec!["insert INSERT INTO users VALUES (1)"]);
        assert!(!f.adapter.using_master());

        f.adapter.select(&mut cx, "SELECT * FROM users", &[]).unwrap();
        assert_eq!(f.replicas[0].calls().len(), 2);
    }

    #[test]
    fn test_reload_bypasses_cached_replica_rows() {
        let f = fixture(0, &[1]);
        let mut cx = SelectionContext::from_policy(ReadPolicy::Random);
        cx.enable_query_cache();

        assert_eq!(source(f.adapter.select(&mut cx, "SELECT * FROM users", &[])), "replica_0");
        let reloaded = f
            .adapter
            .reload(&mut cx, |cx| source(f.adapter.select(cx, "SELECT * FROM users", &[])));

        assert_eq!(reloaded, "primary");
        assert_eq!(f.primary.calls(), vec!["select SELECT * FROM users"]);
    }

    #[test]
    fn test_transaction_reads_skip_the_cache() {
        let f = fixture(0, &[1]);
        let mut cx = SelectionContext::from_policy(ReadPolicy::Random);
        cx.enable_query_cache();
        f.adapter.select(&mut cx, "SELECT 1", &[]).unwrap();

        let inside = f
            .adapter
            .transaction(&mut cx, |cx| Ok::<_, DbError>(source(f.adapter.select(cx, "SELECT 1", &[]))))
            .unwrap();

        assert_eq!(inside, "primary");
        assert_eq!(cx.query_cache().len(), 1);
    }

    #[test]
    fn test_contexts_do_not_share_cached_reads() {
        let f = fixture(0, &[1]);
        let mut first = SelectionContext::from_policy(ReadPolicy::Random);
        let mut second = SelectionContext::from_policy(ReadPolicy::Random);
        first.enable_query_cache();
        second.enable_query_cache();

        f.adapter.select(&mut first, "SELECT 1", &[]).unwrap();
        f.adapter.select(&mut second, "SELECT 1", &[]).unwrap();
        assert_eq!(f.replicas[0].calls().len(), 2);

        // a write through another caller stales this context's entries
        f.adapter.update("UPDATE users SET name = 'x'", &[]).unwrap();
        f.adapter.select(&mut first, "SELECT 1", &[]).unwrap();
        assert_eq!(f.replicas[0].calls().len(), 3);
    }

    #[test]
    fn test_suppress_accepts_any_handle_to_the_member() {
        let f = fixture(0, &[1, 1]);
        let rewrapped = ConnectionHandle::new("replica_0", f.replicas[0].clone());

        let outcome = f.adapter.suppress_read_connection(&rewrapped, Duration::from_secs(30));
        assert!(matches!(outcome, SuppressOutcome::Suppressed { .. }));
        assert_eq!(f.adapter.available_read_connections(), vec![f.adapter.replicas()[1].clone()]);
    }

    #[test]
    fn test_raw_connection_forces_master() {
        let f = fixture(1, &[1]);
        let forced = f
            .adapter
            .with_raw_connection(|conn| {
                assert_eq!(conn.adapter_name(), "stub");
                Ok(f.adapter.using_master())
            })
            .unwrap();
        assert!(forced);
        assert!(!f.adapter.using_master());
    }

    #[test]
    fn test_transaction_commits_and_reads_from_primary() {
        let f = fixture(0, &[1]);
        let mut cx = SelectionContext::from_policy(ReadPolicy::Random);

        let value = f.adapter.transaction(&mut cx, |cx| {
            assert!(f.adapter.using_master());
            Ok::<_, DbError>(source(f.adapter.select(cx, "SELECT 1", &[])))
        });

        assert_eq!(value.unwrap(), "primary");
        assert_eq!(f.primary.calls(), vec!["begin", "select SELECT 1", "commit"]);
        assert!(f.replicas[0].calls().is_empty());
        assert!(!f.adapter.using_master());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let f = fixture(1, &[]);
        let mut cx = SelectionContext::new();

        let result: Result<(), DbError> = f
            .adapter
            .transaction(&mut cx, |_| Err(DbError::Statement("constraint violated".into())));

        assert_eq!(result, Err(DbError::Statement("constraint violated".into())));
        assert_eq!(f.primary.calls(), vec!["begin", "rollback"]);
    }

    #[test]
    fn test_reload_forces_master_for_call_only() {
        let f = fixture(0, &[1]);
        let mut cx = SelectionContext::from_policy(ReadPolicy::Persistent);

        let inside = f.adapter.reload(&mut cx, |cx| source(f.adapter.select(cx, "SELECT 1", &[])));
        assert_eq!(inside, "primary");
        assert_eq!(source(f.adapter.select(&mut cx, "SELECT 1", &[])), "replica_0");
    }

    #[test]
    fn test_nested_force_master() {
        let f = fixture(1, &[1]);
        f.adapter.with_forced_master(|| {
            f.adapter.with_forced_master(|| assert!(f.adapter.using_master()));
            assert!(f.adapter.using_master());
        });
        assert!(!f.adapter.using_master());
    }

    #[test]
    fn test_pick_falls_back_to_primary_when_rotation_empty() {
        let f = fixture(0, &[]);
        assert!(f.adapter.available_read_connections().is_empty());
        assert_eq!(f.adapter.pick_weighted_replica(), *f.adapter.primary());
    }

    #[test]
    fn test_names_registered_for_lifetime() {
        let names = ConnectionNames::new();
        let primary = StubConnection::shared("primary");
        let adapter = PoolAdapter::new(
            PoolMember::new(PRIMARY_ROLE, primary, 1),
            vec![PoolMember::new("replica_0", StubConnection::shared("replica_0"), 1)],
            AdapterOptions::default().with_names(names.clone()),
        )
        .unwrap();

        let replica_id = adapter.replicas()[0].id();
        assert_eq!(names.name(replica_id).as_deref(), Some("replica_0"));
        assert_eq!(names.len(), 2);

        drop(adapter);
        assert!(names.is_empty());
    }
}
