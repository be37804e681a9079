//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the pool names an adapter and never names itself
//! - Validate value ranges (weights >= 0, durations > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use thiserror::Error;

use crate::adapter::{POOL_ADAPTER_NAME, PRIMARY_ROLE};
use crate::config::resolver::{self, replica_role};
use crate::config::schema::RouterConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("database configuration does not specify adapter")]
    AdapterNotSpecified,

    #[error("{role}: database pool must not be recursive")]
    RecursivePool { role: String },

    #[error("{role}: pool_weight must be a non-negative integer, got {value}")]
    InvalidWeight { role: String, value: String },

    #[error("{role}: invalid url: {reason}")]
    InvalidUrl { role: String, reason: String },

    #[error("{field} must be a positive number of seconds, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let pool = &config.pool;

    if resolver::primary_adapter(pool).is_none() {
        errors.push(ValidationError::AdapterNotSpecified);
    }

    if pool.pool_adapter.as_deref() == Some(POOL_ADAPTER_NAME) {
        errors.push(ValidationError::RecursivePool {
            role: "pool_adapter".to_string(),
        });
    }

    if let Some(value) = pool.defaults.get(resolver::WEIGHT_KEY) {
        if let Err(value) = resolver::parse_weight(value) {
            errors.push(ValidationError::InvalidWeight {
                role: "pool".to_string(),
                value,
            });
        }
    }

    let entries = std::iter::once((PRIMARY_ROLE.to_string(), &pool.master)).chain(
        pool.read_pool
            .iter()
            .enumerate()
            .map(|(index, entry)| (replica_role(index), entry)),
    );
    for (role, entry) in entries {
        if entry.get(resolver::ADAPTER_KEY).and_then(|v| v.as_str()) == Some(POOL_ADAPTER_NAME) {
            errors.push(ValidationError::RecursivePool { role: role.clone() });
        }
        if let Some(value) = entry.get(resolver::WEIGHT_KEY) {
            if let Err(value) = resolver::parse_weight(value) {
                errors.push(ValidationError::InvalidWeight {
                    role: role.clone(),
                    value,
                });
            }
        }
        if let Some(value) = entry.get(resolver::URL_KEY) {
            let parsed = value
                .as_str()
                .ok_or_else(|| "url must be a string".to_string())
                .and_then(|raw| url::Url::parse(raw).map_err(|e| e.to_string()));
            if let Err(reason) = parsed {
                errors.push(ValidationError::InvalidUrl { role, reason });
            }
        }
    }

    for (field, value) in [
        ("suppression.cooldown_secs", config.suppression.cooldown_secs),
        ("suppression.retry_delay_secs", config.suppression.retry_delay_secs),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ValidationError::NonPositiveDuration { field, value });
        }
    }

    let level = config.observability.log_level.as_str();
    if !level.eq_ignore_ascii_case("off") && tracing::Level::from_str(level).is_err() {
        errors.push(ValidationError::UnknownLogLevel(level.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
