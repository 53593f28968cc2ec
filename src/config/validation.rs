//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required contexts are declared
//! - Options required by `do_writes` / `do_reloads` are present
//! - Restart pacing values are in range
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GeneratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GeneratorConfig;

/// Contexts every document needs.
const REQUIRED_CONTEXTS: [&str; 2] = ["main", "events"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("nginx requires a contexts.{0} section")]
    MissingContext(&'static str),

    #[error("the `{option}` option is required when `{flag}` is true")]
    MissingOption {
        option: &'static str,
        flag: &'static str,
    },

    #[error("restart_jitter must be a finite non-negative number, got {0}")]
    InvalidJitter(f64),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GeneratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for context in REQUIRED_CONTEXTS {
        if !config.contexts.contains_key(context) {
            errors.push(ValidationError::MissingContext(context));
        }
    }

    if config.do_writes {
        if config.config_file_path.is_none() {
            errors.push(ValidationError::MissingOption {
                option: "config_file_path",
                flag: "do_writes",
            });
        }
        if config.check_command.is_none() {
            errors.push(ValidationError::MissingOption {
                option: "check_command",
                flag: "do_writes",
            });
        }
    }

    if config.do_reloads {
        if config.reload_command.is_none() {
            errors.push(ValidationError::MissingOption {
                option: "reload_command",
                flag: "do_reloads",
            });
        }
        if config.start_command.is_none() {
            errors.push(ValidationError::MissingOption {
                option: "start_command",
                flag: "do_reloads",
            });
        }
    }

    if !config.restart_jitter.is_finite() || config.restart_jitter < 0.0 {
        errors.push(ValidationError::InvalidJitter(config.restart_jitter));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
