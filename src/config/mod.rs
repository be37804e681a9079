//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, every problem reported)
//!     → RouterConfig (validated, immutable)
//!     → resolver.rs ([pool] block → primary spec + replica specs)
//!     → connection::FactoryRegistry opens each spec
//!     → PoolAdapter::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the adapter is built; weights never change
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Unknown keys in `[pool]` are driver settings inherited by every entry

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config};
pub use resolver::{resolve_pool, ResolvedPool};
pub use schema::{ObservabilityConfig, PoolConfig, RouterConfig, RoutingConfig, SuppressionConfig};
pub use validation::{validate_config, ValidationError};
