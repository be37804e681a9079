//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use replica_router::adapter::{AdapterOptions, PoolAdapter, PRIMARY_ROLE};
use replica_router::connection::{Column, ConnectionSpec, FactoryRegistry, ResultSet, SubConnection, Value};
use replica_router::error::{DbError, DbResult};
use replica_router::load_balancer::PoolMember;

/// A scriptable database connection.
///
/// While inactive every statement fails with a connectivity error.
/// Queued failures are returned first, one per statement.
#[derive(Debug)]
pub struct MockConnection {
    pub role: String,
    active: AtomicBool,
    reconnect_ok: AtomicBool,
    reconnect_delay: Mutex<Duration>,
    failures: Mutex<VecDeque<DbError>>,
    log: Mutex<Vec<String>>,
    reads: AtomicUsize,
    reconnects: AtomicUsize,
}

impl MockConnection {
    pub fn new(role: &str) -> Arc<Self> {
        Arc::new(Self {
            role: role.to_string(),
            active: AtomicBool::new(true),
            reconnect_ok: AtomicBool::new(true),
            reconnect_delay: Mutex::new(Duration::ZERO),
            failures: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
        })
    }

    /// Server gone: inactive, and reconnects are refused.
    pub fn kill(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.reconnect_ok.store(false, Ordering::SeqCst);
    }

    /// Server back: the next reconnect succeeds.
    pub fn revive(&self) {
        self.reconnect_ok.store(true, Ordering::SeqCst);
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Make every reconnect take `delay` before it answers.
    pub fn set_reconnect_delay(&self, delay: Duration) {
        *self.reconnect_delay.lock().unwrap() = delay;
    }

    pub fn fail_next(&self, error: DbError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    fn statement(&self, entry: String) -> DbResult<()> {
        self.log.lock().unwrap().push(entry);
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        if !self.active.load(Ordering::SeqCst) {
            return Err(DbError::Connectivity(format!("{} is not connected", self.role)));
        }
        Ok(())
    }

    fn read(&self, entry: String) -> DbResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.statement(entry)
    }
}

impl SubConnection for MockConnection {
    fn adapter_name(&self) -> &str {
        "mock"
    }

    fn select(&self, sql: &str, _binds: &[Value]) -> DbResult<ResultSet> {
        self.read(format!("select {sql}"))?;
        Ok(ResultSet::new(
            vec!["source".to_string()],
            vec![vec![Value::String(self.role.clone())]],
        ))
    }

    fn tables(&self) -> DbResult<Vec<String>> {
        self.read("tables".to_string())?;
        Ok(vec!["users".to_string(), "orders".to_string()])
    }

    fn columns(&self, table: &str) -> DbResult<Vec<Column>> {
        self.read(format!("columns {table}"))?;
        Ok(vec![Column {
            name: "id".to_string(),
            sql_type: "bigint".to_string(),
            nullable: false,
        }])
    }

    fn execute(&self, sql: &str) -> DbResult<u64> {
        self.statement(format!("execute {sql}"))?;
        Ok(0)
    }

    fn insert(&self, sql: &str, _binds: &[Value]) -> DbResult<Option<i64>> {
        self.statement(format!("insert {sql}"))?;
        Ok(Some(42))
    }

    fn update(&self, sql: &str, _binds: &[Value]) -> DbResult<u64> {
        self.statement(format!("update {sql}"))?;
        Ok(1)
    }

    fn delete(&self, sql: &str, _binds: &[Value]) -> DbResult<u64> {
        self.statement(format!("delete {sql}"))?;
        Ok(1)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn reconnect(&self) -> DbResult<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        let delay = *self.reconnect_delay.lock().unwrap();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.reconnect_ok.load(Ordering::SeqCst) {
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(DbError::Connectivity(format!("{} refused connection", self.role)))
        }
    }

    fn disconnect(&self) -> DbResult<()> {
        self.log.lock().unwrap().push("disconnect".to_string());
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn reset_runtime(&self) -> f64 {
        0.25
    }

    fn begin_transaction(&self) -> DbResult<()> {
        self.statement("begin".to_string())
    }

    fn commit_transaction(&self) -> DbResult<()> {
        self.statement("commit".to_string())
    }

    fn rollback_transaction(&self) -> DbResult<()> {
        self.statement("rollback".to_string())
    }
}

/// Every connection a mock factory has opened, by role.
#[derive(Clone, Default)]
pub struct MockCluster {
    opened: Arc<Mutex<Vec<(ConnectionSpec, Arc<MockConnection>)>>>,
    refuse: Arc<Mutex<Vec<String>>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the factory fail for `role`.
    pub fn refuse(&self, role: &str) {
        self.refuse.lock().unwrap().push(role.to_string());
    }

    /// A registry whose `adapter` factory opens mock connections.
    pub fn registry(&self, adapters: &[&str]) -> FactoryRegistry {
        let mut registry = FactoryRegistry::new();
        for adapter in adapters {
            let cluster = self.clone();
            registry.register(*adapter, move |spec: &ConnectionSpec| -> DbResult<Arc<dyn SubConnection>> {
                if cluster.refuse.lock().unwrap().contains(&spec.role) {
                    return Err(DbError::Connectivity(format!("{} unreachable", spec.role)));
                }
                let connection = MockConnection::new(&spec.role);
                cluster.opened.lock().unwrap().push((spec.clone(), connection.clone()));
                Ok(connection as Arc<dyn SubConnection>)
            });
        }
        registry
    }

    pub fn get(&self, role: &str) -> Arc<MockConnection> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .find(|(spec, _)| spec.role == role)
            .map(|(_, conn)| conn.clone())
            .unwrap_or_else(|| panic!("no connection opened for {role}"))
    }

    pub fn spec(&self, role: &str) -> ConnectionSpec {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .find(|(spec, _)| spec.role == role)
            .map(|(spec, _)| spec.clone())
            .unwrap_or_else(|| panic!("no connection opened for {role}"))
    }

    pub fn opened_roles(&self) -> Vec<String> {
        self.opened.lock().unwrap().iter().map(|(spec, _)| spec.role.clone()).collect()
    }
}

/// A pool of mock connections built directly, bypassing configuration.
pub struct TestPool {
    pub adapter: PoolAdapter,
    pub primary: Arc<MockConnection>,
    pub replicas: Vec<Arc<MockConnection>>,
}

pub fn test_pool(primary_weight: i64, replica_weights: &[i64], options: AdapterOptions) -> TestPool {
    let primary = MockConnection::new(PRIMARY_ROLE);
    let replicas: Vec<_> = (0..replica_weights.len())
        .map(|i| MockConnection::new(&format!("replica_{i}")))
        .collect();
    let members = replicas
        .iter()
        .zip(replica_weights)
        .map(|(conn, weight)| PoolMember::new(conn.role.clone(), conn.clone(), *weight))
        .collect();
    let adapter = PoolAdapter::new(
        PoolMember::new(PRIMARY_ROLE, primary.clone(), primary_weight),
        members,
        options,
    )
    .unwrap();
    TestPool {
        adapter,
        primary,
        replicas,
    }
}

/// Role of the connection that served a `select`.
pub fn served_by(result: DbResult<ResultSet>) -> String {
    let result = result.unwrap();
    result.rows[0][0].as_str().unwrap().to_string()
}
