//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to HttpService::new / ReqwestTransport::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the cache TTL is fixed at construction
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, ClientConfig, EndpointConfig, LogFormat, ObservabilityConfig, TransportConfig,
};
pub use validation::{validate_config, ValidationError};
