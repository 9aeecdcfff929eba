//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting, drains in-flight requests
//!             → tokens handed to cache calls report cancelled
//! ```
//!
//! # Design Decisions
//! - One cancellation source drives both graceful HTTP shutdown and
//!   cancellation of cache work that has not started yet

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
