//! Path-encoded HTTP forward proxy.
//!
//! A request to `/<marker>/<percent-encoded-url>` (or `/<percent-encoded-url>`
//! in bare mode) is re-issued against the decoded URL and the response is
//! streamed back with framing restrictions removed and CORS opened.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
