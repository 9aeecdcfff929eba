//! HTTP exposure of the config cache.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, limits)
//!     → handlers.rs (resolve config name, validate body)
//!     → cache (on the blocking pool)
//!     → raw document or {"error": ...}
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
