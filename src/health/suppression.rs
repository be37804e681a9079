//! Time-boxed suppression of failed read connections.
//!
//! [`SuppressionStack`] is plain state and never touches a connection.
//! [`SharedSuppression`] puts it behind the adapter's mutex and runs every
//! reconnect with that mutex released.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::connection::ConnectionHandle;
use crate::error::{DbError, DbResult};
use crate::observability::metrics;

/// Default exclusion after a read connection is found dead.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Default wait before retrying a member whose reinstatement failed.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Upper bound for any single exclusion.
const MAX_SUPPRESSION: Duration = Duration::from_secs(24 * 60 * 60);

/// The read rotation usable during one window of time.
#[derive(Debug, Clone)]
pub struct AvailabilitySnapshot {
    epoch: u64,
    connections: Vec<ConnectionHandle>,
    excluded: Option<ConnectionHandle>,
    expires_at: Option<Instant>,
}

impl AvailabilitySnapshot {
    fn base(connections: Vec<ConnectionHandle>) -> Self {
        Self {
            epoch: 0,
            connections,
            excluded: None,
            expires_at: None,
        }
    }

    /// Weighted rotation (repetitions kept) usable while this snapshot is live.
    pub fn connections(&self) -> &[ConnectionHandle] {
        &self.connections
    }

    /// The member this snapshot keeps out of rotation.
    pub fn excluded(&self) -> Option<&ConnectionHandle> {
        self.excluded.as_ref()
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    fn contains(&self, connection: &ConnectionHandle) -> bool {
        self.connections.contains(connection)
    }
}

/// Result of a suppress call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressOutcome {
    /// The connection was not in the current rotation; nothing changed.
    NotAvailable,
    /// The connection is excluded until the given instant.
    Suppressed { until: Instant },
    /// Excluding it would have emptied the rotation; everything was restored.
    Reset,
}

/// A reinstatement claimed from the stack, to be attempted without the lock.
#[derive(Debug, Clone)]
pub struct Reinstatement {
    epoch: u64,
    connection: ConnectionHandle,
}

impl Reinstatement {
    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }
}

/// LIFO history of exclusions layered over the full rotation.
///
/// Index 0 is the full weighted rotation and never expires. Every later
/// entry is the rotation minus one more member, valid until its deadline.
#[derive(Debug)]
pub struct SuppressionStack {
    snapshots: Vec<AvailabilitySnapshot>,
    retry_delay: Duration,
    next_epoch: u64,
}

impl SuppressionStack {
    pub fn new(rotation: Vec<ConnectionHandle>, retry_delay: Duration) -> Self {
        metrics::record_available_connections(rotation.len());
        Self {
            snapshots: vec![AvailabilitySnapshot::base(rotation)],
            retry_delay: retry_delay.min(MAX_SUPPRESSION),
            next_epoch: 1,
        }
    }

    /// Number of snapshots, including the base.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    /// The full rotation (base snapshot).
    pub fn base(&self) -> &[ConnectionHandle] {
        &self.snapshots[0].connections
    }

    pub fn top(&self) -> &AvailabilitySnapshot {
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// The top snapshot's rotation, as it stands. Expiry is not applied.
    pub fn available(&self) -> &[ConnectionHandle] {
        &self.top().connections
    }

    /// Claim the expired top exclusion, if any.
    ///
    /// The claimed snapshot's deadline moves `retry_delay` ahead, so other
    /// callers keep reading from it instead of claiming the same member.
    pub fn claim_expired(&mut self, now: Instant) -> Option<Reinstatement> {
        if self.snapshots.len() < 2 {
            return None;
        }
        let retry_delay = self.retry_delay;
        let top = self.snapshots.last_mut()?;
        if !top.is_expired(now) {
            return None;
        }
        let connection = top.excluded.clone()?;
        top.expires_at = Some(deadline(now, retry_delay));
        Some(Reinstatement {
            epoch: top.epoch,
            connection,
        })
    }

    /// Record how a claimed reinstatement went.
    ///
    /// On success the snapshot is popped if it is still on top; if newer
    /// exclusions were pushed meanwhile it becomes due immediately instead.
    /// A snapshot dropped by a reset in the meantime is ignored.
    pub fn complete(&mut self, claim: &Reinstatement, result: DbResult<()>, now: Instant) {
        let Some(index) = self.snapshots.iter().position(|s| s.epoch == claim.epoch && s.excluded.is_some()) else {
            return;
        };
        let failed = &claim.connection;
        match result {
            Ok(()) => {
                metrics::record_reinstatement(failed.role(), true);
                if index == self.snapshots.len() - 1 {
                    self.snapshots.pop();
                    metrics::record_available_connections(self.available().len());
                } else {
                    self.snapshots[index].expires_at = Some(now);
                }
            }
            Err(e) => {
                tracing::warn!(
                    connection = %failed,
                    error = %e,
                    retry_in_secs = self.retry_delay.as_secs_f64(),
                    "Failed to reconnect to database when adding connection back to the pool"
                );
                metrics::record_reinstatement(failed.role(), false);
                self.snapshots[index].expires_at = Some(deadline(now, self.retry_delay));
            }
        }
    }

    /// Take `connection` out of the rotation for `duration`.
    ///
    /// Expired exclusions are not reinstated here; callers refresh first.
    pub fn suppress_at(&mut self, connection: &ConnectionHandle, duration: Duration, now: Instant) -> SuppressOutcome {
        let current = self.top();
        if !current.contains(connection) {
            return SuppressOutcome::NotAvailable;
        }

        let remaining: Vec<_> = current
            .connections
            .iter()
            .filter(|c| *c != connection)
            .cloned()
            .collect();

        if remaining.is_empty() {
            tracing::warn!("All read connections are marked dead; trying them all again.");
            self.reset();
            return SuppressOutcome::Reset;
        }

        let until = deadline(now, duration);
        tracing::warn!(
            connection = %connection,
            secs = duration.as_secs_f64(),
            "Removing connection from the read pool"
        );
        metrics::record_suppression(connection.role());
        metrics::record_available_connections(remaining.len());
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.snapshots.push(AvailabilitySnapshot {
            epoch,
            connections: remaining,
            excluded: Some(connection.clone()),
            expires_at: Some(until),
        });
        SuppressOutcome::Suppressed { until }
    }

    /// Drop every exclusion.
    pub fn reset(&mut self) {
        self.snapshots.truncate(1);
        metrics::record_available_connections(self.base().len());
    }

    /// Each distinct base member once, in rotation order.
    pub fn members(&self) -> Vec<ConnectionHandle> {
        let mut members: Vec<ConnectionHandle> = Vec::new();
        for connection in self.base() {
            if !members.contains(connection) {
                members.push(connection.clone());
            }
        }
        members
    }
}

/// A [`SuppressionStack`] shared by every caller of one adapter.
///
/// The lock is only held for bookkeeping; reconnects happen outside it.
#[derive(Debug)]
pub struct SharedSuppression {
    stack: Mutex<SuppressionStack>,
}

impl SharedSuppression {
    pub fn new(stack: SuppressionStack) -> Self {
        Self {
            stack: Mutex::new(stack),
        }
    }

    /// Connections usable right now.
    pub fn available(&self) -> Vec<ConnectionHandle> {
        self.available_at(Instant::now())
    }

    /// Connections usable at `now`, reinstating expired exclusions first.
    pub fn available_at(&self, now: Instant) -> Vec<ConnectionHandle> {
        self.with_available(now, <[ConnectionHandle]>::to_vec)
    }

    /// Refresh, then run `f` over the usable rotation under the lock.
    pub fn with_available<T>(&self, now: Instant, f: impl FnOnce(&[ConnectionHandle]) -> T) -> T {
        self.refresh(now);
        f(self.lock().available())
    }

    pub fn suppress(&self, connection: &ConnectionHandle, duration: Duration) -> SuppressOutcome {
        self.suppress_at(connection, duration, Instant::now())
    }

    pub fn suppress_at(&self, connection: &ConnectionHandle, duration: Duration, now: Instant) -> SuppressOutcome {
        self.refresh(now);
        let (outcome, members) = {
            let mut stack = self.lock();
            let outcome = stack.suppress_at(connection, duration, now);
            let members = match outcome {
                SuppressOutcome::Reset => stack.members(),
                _ => Vec::new(),
            };
            (outcome, members)
        };
        reconnect_inactive(&members);
        outcome
    }

    /// Drop every exclusion and give inactive members one reconnect attempt.
    pub fn reset(&self) {
        let members = {
            let mut stack = self.lock();
            stack.reset();
            stack.members()
        };
        reconnect_inactive(&members);
    }

    pub fn depth(&self) -> usize {
        self.lock().depth()
    }

    /// Work through expired exclusions from the top down.
    fn refresh(&self, now: Instant) {
        let attempts = self.lock().depth();
        for _ in 0..attempts {
            let Some(claim) = self.lock().claim_expired(now) else {
                return;
            };
            tracing::info!(connection = %claim.connection(), "Adding dead database connection back to the pool");
            let result = reinstate(claim.connection());
            self.lock().complete(&claim, result, now);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SuppressionStack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn reinstate(connection: &ConnectionHandle) -> DbResult<()> {
    connection.reconnect()?;
    if connection.is_active() {
        Ok(())
    } else {
        Err(DbError::Connectivity(format!("{connection} still inactive after reconnect")))
    }
}

fn reconnect_inactive(members: &[ConnectionHandle]) {
    for connection in members.iter().filter(|c| !c.is_active()) {
        if let Err(e) = connection.reconnect() {
            tracing::debug!(connection = %connection, error = %e, "Reconnect during pool reset failed");
        }
    }
}

fn deadline(now: Instant, duration: Duration) -> Instant {
    now + duration.min(MAX_SUPPRESSION)
}
