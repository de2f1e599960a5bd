//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, redirect limit bounded)
//! - Check addresses parse before anything binds them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ExtractionMode, ProxyConfig};

/// Upper bound on redirect hops a deployment may configure.
pub const MAX_REDIRECT_LIMIT: usize = 50;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("extraction.marker must not be empty in prefix mode")]
    EmptyMarker,

    #[error("extraction.marker '{0}' must not contain '/', '?' or '%'")]
    MarkerReservedChar(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("upstream.max_redirects is {0}, limit is {MAX_REDIRECT_LIMIT}")]
    TooManyRedirects(usize),

    #[error("security.allowed_hosts contains an empty entry")]
    EmptyAllowedHost,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.extraction.mode == ExtractionMode::Prefix {
        let marker = config.extraction.marker.as_str();
        if marker.is_empty() {
            errors.push(ValidationError::EmptyMarker);
        } else if marker.contains(['/', '?', '%']) {
            errors.push(ValidationError::MarkerReservedChar(marker.to_string()));
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.upstream.max_redirects > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::TooManyRedirects(config.upstream.max_redirects));
    }

    if config.security.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::EmptyAllowedHost);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
