//! File-backed JSON configuration cache with an HTTP front end.

pub mod admin;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use cache::{CacheError, ConfigCache, Stats};
pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
