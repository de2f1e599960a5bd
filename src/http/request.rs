//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Prepare the inbound request for forwarding to the target
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Method, headers and body are carried over untouched; the only optional
//!   change is dropping `Host`
//! - Body is moved as a stream, never collected

use axum::body::{Body, HttpBody};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::routing::TargetUrl;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The outbound request re-issued against the target.
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// `None` when the inbound body is known to be empty.
    pub body: Option<Body>,
    pub target: TargetUrl,
}

impl ProxyRequest {
    /// Consume an inbound request and point it at `target`.
    pub fn from_inbound(request: Request<Body>, target: TargetUrl, preserve_host: bool) -> Self {
        let (parts, body) = request.into_parts();
        let mut headers = parts.headers;
        if !preserve_host {
            headers.remove(header::HOST);
        }

        let body = if body.is_end_stream() { None } else { Some(body) };

        Self {
            method: parts.method,
            headers,
            body,
            target,
        }
    }
}
