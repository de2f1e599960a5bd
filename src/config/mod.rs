//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides applied in main.rs
//!     → validation.rs (semantic checks, once, on the merged result)
//!     → ProxyConfig (validated, immutable)
//!     → shared with the HTTP server at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{
    ExtractionConfig, ExtractionMode, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig,
    SecurityConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
