//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (deadline on the fetch, until response headers arrive)
//!     → On expiry: 504, upstream future dropped
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Single attempt; failures are reported, never retried
//! - Connect timeout is left to the HTTP client

pub mod timeouts;

pub use timeouts::with_deadline;
