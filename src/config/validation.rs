//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value shapes (type URL form, known log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: CompilerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::CompilerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a compiler configuration, collecting every failure.
pub fn validate_config(config: &CompilerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.envelope.type_url.is_empty() {
        errors.push(ValidationError {
            field: "envelope.type_url".into(),
            message: "must not be empty".into(),
        });
    } else if !config.envelope.type_url.contains('/') {
        errors.push(ValidationError {
            field: "envelope.type_url".into(),
            message: "must be of the form <authority>/<type name>".into(),
        });
    }

    let level = config.observability.log_level.as_str();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ValidationError {
            field: "observability.log_level".into(),
            message: format!("unknown level {:?}", level),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
