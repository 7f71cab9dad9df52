//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to startup, which builds the registry and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; registry contents live in their own
//!   snapshot file and change at runtime through the HTTP API
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RegistryConfig;
pub use schema::RpcConfig;
pub use schema::SeedService;
pub use schema::TimeoutConfig;
