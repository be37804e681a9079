//! Scriptable in-memory connection for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::connection::{Column, ConnectionHandle, ResultSet, SubConnection, Value};
use crate::error::{DbError, DbResult};

#[derive(Debug)]
pub(crate) struct StubConnection {
    pub name: String,
    pub active: AtomicBool,
    pub reconnect_ok: AtomicBool,
    pub revive_on_reconnect: AtomicBool,
    pub fail_next: AtomicUsize,
    pub reconnects: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl StubConnection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            active: AtomicBool::new(true),
            reconnect_ok: AtomicBool::new(true),
            revive_on_reconnect: AtomicBool::new(true),
            fail_next: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    pub fn handle(name: &str) -> ConnectionHandle {
        ConnectionHandle::new(name, Self::shared(name))
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> DbResult<()> {
        self.calls.lock().unwrap().push(call);
        let pending = self.fail_next.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next.store(pending - 1, Ordering::SeqCst);
            return Err(DbError::Connectivity(format!("{} is down", self.name)));
        }
        Ok(())
    }
}

impl SubConnection for StubConnection {
    fn adapter_name(&self) -> &str {
        "stub"
    }

    fn select(&self, sql: &str, _binds: &[Value]) -> DbResult<ResultSet> {
        self.record(format!("select {sql}"))?;
        Ok(ResultSet::new(
            vec!["source".into()],
            vec![vec![Value::String(self.name.clone())]],
        ))
    }

    fn tables(&self) -> DbResult<Vec<String>> {
        self.record("tables".into())?;
        Ok(vec!["users".into()])
    }

    fn columns(&self, table: &str) -> DbResult<Vec<Column>> {
        self.record(format!("columns {table}"))?;
        Ok(Vec::new())
    }

    fn execute(&self, sql: &str) -> DbResult<u64> {
        self.record(format!("execute {sql}"))?;
        Ok(0)
    }

    fn insert(&self, sql: &str, _binds: &[Value]) -> DbResult<Option<i64>> {
        self.record(format!("insert {sql}"))?;
        Ok(Some(1))
    }

    fn update(&self, sql: &str, _binds: &[Value]) -> DbResult<u64> {
        self.record(format!("update {sql}"))?;
        Ok(1)
    }

    fn delete(&self, sql: &str, _binds: &[Value]) -> DbResult<u64> {
        self.record(format!("delete {sql}"))?;
        Ok(1)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn reconnect(&self) -> DbResult<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        if self.reconnect_ok.load(Ordering::SeqCst) {
            if self.revive_on_reconnect.load(Ordering::SeqCst) {
                self.set_active(true);
            }
            Ok(())
        } else {
            Err(DbError::Connectivity(format!("{} refused", self.name)))
        }
    }

    fn disconnect(&self) -> DbResult<()> {
        self.record("disconnect".into())?;
        self.set_active(false);
        Ok(())
    }

    fn reset_runtime(&self) -> f64 {
        1.5
    }

    fn begin_transaction(&self) -> DbResult<()> {
        self.record("begin".into())
    }

    fn commit_transaction(&self) -> DbResult<()> {
        self.record("commit".into())
    }

    fn rollback_transaction(&self) -> DbResult<()> {
        self.record("rollback".into())
    }
}
