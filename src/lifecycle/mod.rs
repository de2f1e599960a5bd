//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Apply CLI overrides → Validate → Init logging/metrics → Bind
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then listener
//! - Shutdown is broadcast so tests can stop a server without signals

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
