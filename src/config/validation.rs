//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bounded grace period)
//! - Check that the log filter parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FoundationConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::FoundationConfig;

/// Longest accepted `watcher.remove_grace_ms`.
pub const MAX_REMOVE_GRACE_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("watcher.remove_grace_ms {value} exceeds maximum {max}")]
    GraceTooLong { value: u64, max: u64 },

    #[error("invalid observability.log_filter {filter:?}: {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

pub fn validate_config(config: &FoundationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.shutdown.hook_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "shutdown.hook_timeout_ms",
        });
    }
    if config.shutdown.drain_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "shutdown.drain_timeout_ms",
        });
    }

    if config.watcher.remove_grace_ms > MAX_REMOVE_GRACE_MS {
        errors.push(ValidationError::GraceTooLong {
            value: config.watcher.remove_grace_ms,
            max: MAX_REMOVE_GRACE_MS,
        });
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_filter) {
        errors.push(ValidationError::InvalidLogFilter {
            filter: config.observability.log_filter.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
