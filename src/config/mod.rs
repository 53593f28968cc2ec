//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GeneratorConfig (validated, immutable)
//!     → owned by one NginxGenerator
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults except the ones `do_writes`/`do_reloads` require
//! - Validation separates syntactic (serde) from semantic checks
//! - Unknown keys are ignored

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{GeneratorConfig, LoggingConfig};
pub use validation::{validate_config, ValidationError};
