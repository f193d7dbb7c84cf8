//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, CHAIN_ROUTER__* overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → lifecycle::Application boots the router chain from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a new boot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::ContextConfig;
pub use schema::ListenerConfig;
pub use schema::ModuleConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
