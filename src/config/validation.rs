//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity > 0, TTLs ordered)
//! - Validate observability settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DetectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DetectorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &DetectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ingress.capacity == 0 {
        errors.push(ValidationError::new("ingress.capacity", "must be greater than 0"));
    }

    if config.store.live_ttl_secs == 0 {
        errors.push(ValidationError::new("store.live_ttl_secs", "must be greater than 0"));
    } else if config.store.snapshot_ttl_secs < config.store.live_ttl_secs {
        errors.push(ValidationError::new(
            "store.snapshot_ttl_secs",
            format!(
                "must be at least store.live_ttl_secs ({})",
                config.store.live_ttl_secs
            ),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_idle_timeout_secs < config.store.live_ttl_secs
    {
        errors.push(ValidationError::new(
            "observability.metrics_idle_timeout_secs",
            format!(
                "must be at least store.live_ttl_secs ({})",
                config.store.live_ttl_secs
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
