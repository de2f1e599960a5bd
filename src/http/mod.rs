//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → routing (extract + decode target)
//!         → no target: fallback.rs (HTML page, 200)
//!     → security (egress filter)
//!     → request.rs (build forwarded request: method, headers, body stream)
//!     → forward.rs (single upstream fetch, redirects followed, deadline)
//!     → response.rs (strip CSP / X-Frame-Options, add CORS origin)
//!     → Stream to client
//! ```

pub mod fallback;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::UpstreamClient;
pub use request::{ProxyRequest, X_REQUEST_ID};
pub use server::{handle, AppState, HttpServer, ServerError};
