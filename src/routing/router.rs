//! Operation dispatch.
//!
//! # Responsibilities
//! - Send reads to the policy-resolved connection and retry once on failure
//! - Send writes to the primary with master forced for the call
//! - Fan whole-pool operations out to every member
//!
//! # Design Decisions
//! - A failed read against a connection that still reports itself alive is
//!   retried without suppression (statement errors are not outages)
//! - Reads that were forced to master never retry
//! - Replica failures during fan-out are logged and counted, never raised

use crate::adapter::PoolAdapter;
use crate::connection::{ConnectionHandle, SubConnection};
use crate::error::DbResult;
use crate::observability::metrics;
use crate::policy::{ReadPolicy, SelectionContext};
use crate::routing::{Operation, OperationKind};

impl PoolAdapter {
    /// Route `f` according to the class of `operation`.
    ///
    /// Fan-out classes run `f` on every member and return the primary's
    /// result.
    pub fn call<T>(
        &self,
        cx: &mut SelectionContext,
        operation: &Operation,
        f: impl Fn(&dyn SubConnection) -> DbResult<T>,
    ) -> DbResult<T> {
        match operation.kind() {
            OperationKind::ReadOnly => self.route_read(cx, operation, f),
            OperationKind::Write | OperationKind::CacheInvalidatingWrite => self.route_write(operation, f),
            OperationKind::FanOutAll | OperationKind::Aggregate => self.fan_out_all(operation, f),
            OperationKind::FanOutAny => self.fan_out_any(cx, operation, f),
        }
    }

    pub(crate) fn route_read<T>(
        &self,
        cx: &mut SelectionContext,
        operation: &Operation,
        f: impl Fn(&dyn SubConnection) -> DbResult<T>,
    ) -> DbResult<T> {
        let forced = self.using_master();
        let candidate = if forced {
            self.primary().clone()
        } else {
            cx.resolve(self)
        };

        metrics::record_read(candidate.role());
        let error = match f(candidate.connection().as_ref()) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if forced || self.using_master() {
            return Err(error);
        }

        let retry_on = self.reselect(cx, &candidate);
        tracing::info!(
            operation = %operation,
            failed = %candidate,
            retry_on = %retry_on,
            error = %error,
            "Read failed; retrying once"
        );

        metrics::record_read(retry_on.role());
        match f(retry_on.connection().as_ref()) {
            Ok(value) => {
                metrics::record_retry("recovered");
                Ok(value)
            }
            Err(error) => {
                metrics::record_retry("failed");
                tracing::warn!(operation = %operation, connection = %retry_on, error = %error, "Read retry failed");
                Err(error)
            }
        }
    }

    /// Replace a failed read candidate. A live candidate is kept.
    fn reselect(&self, cx: &mut SelectionContext, failed: &ConnectionHandle) -> ConnectionHandle {
        if failed.is_active() {
            return failed.clone();
        }

        self.suppress_read_connection(failed, self.cooldown());
        cx.set_persistent_binding(self.id(), None);
        let next = cx.resolve(self);
        cx.set_persistent_binding(self.id(), Some(next.clone()));
        next
    }

    pub(crate) fn route_write<T>(
        &self,
        operation: &Operation,
        f: impl FnOnce(&dyn SubConnection) -> DbResult<T>,
    ) -> DbResult<T> {
        if operation.kind().clears_query_cache() {
            self.invalidate_query_caches();
        }
        let _master = self.force_master();
        tracing::trace!(operation = %operation, "Routing to primary");
        f(self.primary().connection().as_ref())
    }

    /// Run `f` on every member. The primary's result is returned; replica
    /// failures are swallowed.
    pub(crate) fn fan_out_all<T>(
        &self,
        operation: &Operation,
        f: impl Fn(&dyn SubConnection) -> DbResult<T>,
    ) -> DbResult<T> {
        let primary = f(self.primary().connection().as_ref());
        if let Err(error) = &primary {
            tracing::error!(operation = %operation, error = %error, "Primary failed during fan-out");
        }

        for replica in self.replicas() {
            if let Err(error) = f(replica.connection().as_ref()) {
                tracing::warn!(
                    operation = %operation,
                    connection = %replica,
                    error = %error,
                    "Ignoring replica failure during fan-out"
                );
                metrics::record_fan_out_failure(replica.role());
            }
        }
        primary
    }

    /// Under the Master policy only the primary is asked; otherwise members
    /// are tried in order until one succeeds.
    pub(crate) fn fan_out_any<T>(
        &self,
        cx: &SelectionContext,
        operation: &Operation,
        f: impl Fn(&dyn SubConnection) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut outcome = f(self.primary().connection().as_ref());
        if outcome.is_ok() || self.master_only(cx) {
            return outcome;
        }
        for replica in self.replicas() {
            outcome = f(replica.connection().as_ref());
            if outcome.is_ok() {
                break;
            }
            tracing::debug!(operation = %operation, connection = %replica, "Fan-out member failed");
        }
        outcome
    }

    /// True when health checks should only look at the primary.
    pub(crate) fn master_only(&self, cx: &SelectionContext) -> bool {
        self.using_master() || cx.policy_or(self.default_policy()) == ReadPolicy::Master
    }
}
