//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::health::suppression::{DEFAULT_COOLDOWN, DEFAULT_RETRY_DELAY};
use crate::load_balancer::BalancerKind;
use crate::policy::ReadPolicy;

/// Root configuration for one replica pool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Primary and replica connection entries.
    pub pool: PoolConfig,

    /// Cool-down and reinstatement timing.
    pub suppression: SuppressionConfig,

    /// Read routing defaults.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// The `[pool]` block.
///
/// ```toml
/// [pool]
/// pool_adapter = "postgres"
/// username = "app"
///
/// [pool.master]
/// host = "db-primary"
///
/// [[pool.read_pool]]
/// url = "postgres://db-replica-1/app"
/// pool_weight = 2
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Adapter for entries that do not name one.
    pub pool_adapter: Option<String>,

    /// Primary entry, merged over the inherited settings.
    pub master: toml::Table,

    /// Replica entries in order; each becomes `replica_<index>`.
    pub read_pool: Vec<toml::Table>,

    /// Every other key: inherited by the primary and all replicas.
    #[serde(flatten)]
    pub defaults: toml::Table,
}

/// Suppression timing, in (fractional) seconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SuppressionConfig {
    /// How long a dead read connection stays out of rotation.
    pub cooldown_secs: f64,

    /// Wait before the next attempt after a failed reinstatement.
    pub retry_delay_secs: f64,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN.as_secs_f64(),
            retry_delay_secs: DEFAULT_RETRY_DELAY.as_secs_f64(),
        }
    }
}

impl SuppressionConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or(DEFAULT_COOLDOWN)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_delay_secs).unwrap_or(DEFAULT_RETRY_DELAY)
    }
}

/// Read routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Policy used by contexts that never set one.
    pub default_policy: ReadPolicy,

    /// Replica balancing strategy.
    pub balancer: BalancerKind,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Include event targets in log lines.
    pub log_targets: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_targets: true,
        }
    }
}
