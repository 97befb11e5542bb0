//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CoreConfig (validated, immutable)
//!     → Telemetry::from_config builds the stores
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; bucket bounds in particular must not
//!   change under a running histogram
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AlertConfig, CoreConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig,
    TracingConfig, DEFAULT_BUCKETS,
};
pub use validation::{validate_config, ValidationError};
