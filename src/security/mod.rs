//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Validated TargetUrl:
//!     → egress.rs (allow-list, private address check)
//!     → allowed: forwarded upstream
//!     → denied: 403, never leaves the process
//! ```
//!
//! # Design Decisions
//! - Off by default; the proxy accepts any http(s) target unless configured
//! - Filter is built once from config and shared read-only

pub mod egress;

pub use egress::EgressFilter;
