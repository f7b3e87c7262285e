//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CdmConfig (validated, immutable)
//!     → command-line overrides applied by the binary
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{
    AdminUser, CdmConfig, CloudStorage, ClusterConfig, ClusterNode, CredentialsConfig,
    LogFormat, LoggingConfig, NodeConfig, PollingConfig,
};
pub use validation::{validate_cluster, validate_config, ValidationError};
