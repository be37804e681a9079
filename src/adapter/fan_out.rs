//! Whole-pool operations.
//!
//! The pool is as healthy as its primary: a primary failure is returned to
//! the caller, replica failures are logged and counted.

use crate::adapter::PoolAdapter;
use crate::error::DbResult;
use crate::observability::metrics;
use crate::policy::SelectionContext;
use crate::routing::Operation;

impl PoolAdapter {
    pub fn reconnect(&self) -> DbResult<()> {
        self.fan_out_all(&Operation::Reconnect, |c| c.reconnect())
    }

    pub fn disconnect(&self) -> DbResult<()> {
        self.fan_out_all(&Operation::Disconnect, |c| c.disconnect())
    }

    /// Reset session state on every member.
    pub fn reset(&self) -> DbResult<()> {
        self.fan_out_all(&Operation::Reset, |c| c.reset())
    }

    /// Primary liveness under the Master policy; otherwise true if any
    /// member is alive.
    pub fn is_active(&self, cx: &SelectionContext) -> bool {
        if self.master_only(cx) {
            return self.primary().is_active();
        }
        self.all_connections().iter().any(|c| c.is_active())
    }

    /// Under the Master policy verifies the primary and returns its error.
    /// Otherwise verifies every member and swallows all failures.
    pub fn verify(&self, cx: &SelectionContext) -> DbResult<()> {
        if self.master_only(cx) {
            return self.primary().verify();
        }
        for connection in self.all_connections() {
            if let Err(error) = connection.verify() {
                tracing::warn!(connection = %connection, error = %error, "Verify failed");
                metrics::record_fan_out_failure(connection.role());
            }
        }
        Ok(())
    }

    /// Sum of every member's accumulated runtime, zeroing each counter.
    pub fn reset_runtime(&self) -> f64 {
        self.all_connections().iter().map(|c| c.reset_runtime()).sum()
    }
}
