//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RouterConfig;
use crate::config::validation::validate_config;
use crate::error::{ConfigError, ConfigResult};

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> ConfigResult<RouterConfig> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), replicas = config.pool.read_pool.len(), "Loaded router configuration");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> ConfigResult<RouterConfig> {
    let config: RouterConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
