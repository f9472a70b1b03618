//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT / DB_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to storage and http at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment wins over the file, matching container deployments
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    AppConfig, DatabaseConfig, ListenerConfig, LimitsConfig, LogFormat, ObservabilityConfig,
    StorageBackend, StorageConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
