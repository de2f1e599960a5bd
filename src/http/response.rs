//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Strip framing restrictions, open CORS
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Status code and every other header pass through untouched, `Set-Cookie`
//!   included
//! - `Access-Control-Allow-Origin` is overwritten, not appended

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;

/// Headers removed so the proxied content can be framed.
pub const STRIPPED_HEADERS: [header::HeaderName; 2] =
    [header::CONTENT_SECURITY_POLICY, header::X_FRAME_OPTIONS];

/// Apply the outbound header rewrite in place.
pub fn sanitize_headers(headers: &mut HeaderMap) {
    for name in STRIPPED_HEADERS {
        headers.remove(name);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}

/// Turn the upstream response into the client response.
pub fn relay(mut upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = std::mem::take(upstream.headers_mut());
    sanitize_headers(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
