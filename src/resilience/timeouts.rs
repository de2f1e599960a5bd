//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with a deadline
//! - Cancel the wrapped future cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::{ProxyError, Result};

/// Run `fut` to completion or fail with [`ProxyError::UpstreamTimeout`].
///
/// The future is dropped on expiry, which aborts any in-flight I/O it owns.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProxyError::UpstreamTimeout(limit)),
    }
}
