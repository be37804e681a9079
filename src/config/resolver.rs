//! `[pool]` block → one primary spec and N replica specs.
//!
//! # Responsibilities
//! - Merge inherited top-level keys into every entry
//! - Expand `url` entries into discrete settings
//! - Pick the adapter for each entry and refuse pools of pools
//! - Parse weights and drop replicas that would never serve reads

use serde::Serialize;
use toml::{Table, Value};
use url::Url;

use crate::adapter::{POOL_ADAPTER_NAME, PRIMARY_ROLE};
use crate::config::schema::PoolConfig;
use crate::connection::ConnectionSpec;
use crate::error::{ConfigError, ConfigResult};

pub(crate) const ADAPTER_KEY: &str = "adapter";
pub(crate) const WEIGHT_KEY: &str = "pool_weight";
pub(crate) const URL_KEY: &str = "url";

const DEFAULT_WEIGHT: u32 = 1;

/// Output of [`resolve_pool`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPool {
    pub primary: ConnectionSpec,
    /// Replicas with a non-zero weight, in `read_pool` order.
    pub replicas: Vec<ConnectionSpec>,
}

impl ResolvedPool {
    pub fn specs(&self) -> impl Iterator<Item = &ConnectionSpec> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }

    /// Length of the weighted read rotation these specs produce.
    pub fn rotation_len(&self) -> u64 {
        self.specs().map(|spec| u64::from(spec.weight)).sum()
    }

    /// Primary settings as a standalone connection config (adapter included,
    /// pool keys removed), for tooling that must talk to the primary alone.
    pub fn primary_config(&self) -> Table {
        let mut config = self.primary.settings.clone();
        config.insert(ADAPTER_KEY.to_string(), Value::String(self.primary.adapter.clone()));
        config
    }
}

/// Role name of the replica at `index` in `read_pool`.
pub fn replica_role(index: usize) -> String {
    format!("replica_{index}")
}

/// Resolve the pool block into connection specs.
pub fn resolve_pool(pool: &PoolConfig) -> ConfigResult<ResolvedPool> {
    let defaults = inherited_defaults(pool);

    let primary = resolve_entry(PRIMARY_ROLE, &defaults, &pool.master)?;

    let mut replicas = Vec::with_capacity(pool.read_pool.len());
    for (index, entry) in pool.read_pool.iter().enumerate() {
        let spec = resolve_entry(&replica_role(index), &defaults, entry)?;
        if spec.weight == 0 {
            tracing::debug!(role = %spec.role, "Skipping read connection with zero pool weight");
            continue;
        }
        replicas.push(spec);
    }

    Ok(ResolvedPool { primary, replicas })
}

/// Adapter the primary will use: its own, its URL scheme, else `pool_adapter`.
pub(crate) fn primary_adapter(pool: &PoolConfig) -> Option<String> {
    pool.master
        .get(ADAPTER_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            pool.master
                .get(URL_KEY)
                .and_then(Value::as_str)
                .and_then(|raw| Url::parse(raw).ok())
                .map(|url| scheme_adapter(&url))
        })
        .or_else(|| pool.pool_adapter.clone())
        .filter(|adapter| !adapter.is_empty())
}

/// Parse a `pool_weight` value. Integers and integer strings are accepted.
pub(crate) fn parse_weight(value: &Value) -> Result<u32, String> {
    match value {
        Value::Integer(n) => u32::try_from(*n).map_err(|_| n.to_string()),
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| s.clone()),
        other => Err(other.to_string()),
    }
}

fn inherited_defaults(pool: &PoolConfig) -> Table {
    let mut defaults = pool.defaults.clone();
    defaults.remove(ADAPTER_KEY);
    if let Some(adapter) = &pool.pool_adapter {
        defaults.insert(ADAPTER_KEY.to_string(), Value::String(adapter.clone()));
    }
    defaults
}

fn resolve_entry(role: &str, defaults: &Table, entry: &Table) -> ConfigResult<ConnectionSpec> {
    let mut settings = defaults.clone();
    for (key, value) in entry {
        settings.insert(key.clone(), value.clone());
    }

    if let Some(raw) = settings.remove(URL_KEY) {
        let explicit_adapter = entry.contains_key(ADAPTER_KEY);
        for (key, value) in expand_url(role, &raw)? {
            if key == ADAPTER_KEY && explicit_adapter {
                continue;
            }
            settings.insert(key, value);
        }
    }

    let weight = match settings.remove(WEIGHT_KEY) {
        Some(value) => parse_weight(&value).map_err(|weight| ConfigError::InvalidWeight {
            role: role.to_string(),
            weight,
        })?,
        None => DEFAULT_WEIGHT,
    };

    let adapter = match settings.remove(ADAPTER_KEY) {
        Some(Value::String(adapter)) if !adapter.is_empty() => adapter,
        _ => return Err(ConfigError::AdapterNotSpecified),
    };
    if adapter == POOL_ADAPTER_NAME {
        return Err(ConfigError::RecursivePool);
    }

    Ok(ConnectionSpec {
        role: role.to_string(),
        adapter,
        weight,
        settings,
    })
}

fn expand_url(role: &str, raw: &Value) -> ConfigResult<Table> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        role: role.to_string(),
        reason,
    };
    let raw = raw.as_str().ok_or_else(|| invalid("url must be a string".to_string()))?;
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

    let mut settings = Table::new();
    settings.insert(ADAPTER_KEY.to_string(), Value::String(scheme_adapter(&url)));
    if let Some(host) = url.host_str() {
        settings.insert("host".to_string(), Value::String(host.to_string()));
    }
    if let Some(port) = url.port() {
        settings.insert("port".to_string(), Value::Integer(i64::from(port)));
    }
    if !url.username().is_empty() {
        settings.insert("username".to_string(), Value::String(url.username().to_string()));
    }
    if let Some(password) = url.password() {
        settings.insert("password".to_string(), Value::String(password.to_string()));
    }
    let database = url.path().trim_start_matches('/');
    if !database.is_empty() {
        settings.insert("database".to_string(), Value::String(database.to_string()));
    }
    for (key, value) in url.query_pairs() {
        settings.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    Ok(settings)
}

fn scheme_adapter(url: &Url) -> String {
    url.scheme().replace('-', "_")
}
