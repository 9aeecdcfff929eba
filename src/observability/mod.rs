//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! cache + http handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`config`, `status`) instead of formatted messages
//! - Request ID flows through the trace layer span
//! - Metrics are cheap (atomic increments); without an installed recorder
//!   they are no-ops, so the library can be embedded without the exporter

pub mod logging;
pub mod metrics;
