//! Error types for the proxy request pipeline.
//!
//! Every variant is terminal for its request and converts straight into a
//! plain-text client response. A path without any target is not an error;
//! extraction reports it as `None` and the fallback page is served instead.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced while proxying a single request.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid URL encoding.")]
    Decode,

    #[error("Invalid target URL format. Expected an absolute http:// or https:// URL ({reason}).")]
    InvalidTarget { reason: String },

    #[error("Target host is not allowed: {host}")]
    TargetDenied { host: String },

    #[error("Failed to fetch target URL: {0}")]
    UpstreamFetch(String),

    #[error("Upstream request timed out after {}s", .0.as_secs())]
    UpstreamTimeout(Duration),
}

impl ProxyError {
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        ProxyError::InvalidTarget {
            reason: reason.into(),
        }
    }

    /// Build a fetch error whose message carries the full source chain.
    pub fn upstream_fetch(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ProxyError::UpstreamFetch(message)
    }

    /// HTTP status the client sees for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Decode | ProxyError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            ProxyError::TargetDenied { .. } => StatusCode::FORBIDDEN,
            ProxyError::UpstreamFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Decode => "decode",
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::TargetDenied { .. } => "target_denied",
            ProxyError::UpstreamFetch(_) => "upstream_fetch",
            ProxyError::UpstreamTimeout(_) => "upstream_timeout",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
