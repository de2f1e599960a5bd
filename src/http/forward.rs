//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Issue the single outbound fetch for a proxied request
//! - Follow redirects on the caller's behalf
//! - Bound the wait for response headers
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; connection reuse is left to it
//! - Request body streamed through `wrap_stream`, response body left
//!   unread so the caller can stream it
//! - Transport failures collapse into one error class, timeouts into another
//! - Every redirect hop passes the same egress filter as the first target
//! - A streamed request body cannot be replayed, so a 307/308 answer to a
//!   request with a body is relayed instead of followed

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Result};
use crate::http::request::ProxyRequest;
use crate::resilience::with_deadline;
use crate::security::EgressFilter;

/// Follow up to `max` hops; past that the last 3xx is relayed unchanged.
/// A hop to a host the filter denies aborts the fetch.
fn redirect_policy(max: usize, egress: Arc<EgressFilter>) -> Policy {
    // `previous` already holds the original URL when the first redirect arrives.
    Policy::custom(move |attempt| {
        if let Err(denied) = egress.check_url(attempt.url()) {
            attempt.error(denied)
        } else if attempt.previous().len() > max {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Client used for every upstream fetch.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        config: &UpstreamConfig,
        egress: Arc<EgressFilter>,
    ) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .redirect(redirect_policy(config.max_redirects, egress))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Send `request` and wait for the upstream's response headers.
    pub async fn fetch(&self, request: ProxyRequest) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .request(request.method, request.target.url().clone())
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        with_deadline(self.timeout, async move {
            builder
                .send()
                .await
                .map_err(send_error)
        })
        .await
    }
}

/// A redirect refused by the egress filter surfaces as the filter's own error.
fn send_error(err: reqwest::Error) -> ProxyError {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(ProxyError::TargetDenied { host }) = cause.downcast_ref::<ProxyError>() {
            return ProxyError::TargetDenied { host: host.clone() };
        }
        source = cause.source();
    }
    ProxyError::upstream_fetch(&err)
}
