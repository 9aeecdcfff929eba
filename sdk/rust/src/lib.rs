//! HTTP client for a config-cache server.
//!
//! ```no_run
//! use config_cache_client::ConfigClient;
//!
//! # async fn example() -> Result<(), config_cache_client::ClientError> {
//! let client = ConfigClient::new(reqwest::Client::new(), "http://127.0.0.1:8080")?;
//! let raw = client.get("feature_flags").await?;
//! client.update("feature_flags", raw.to_vec()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{ConfigClient, DEFAULT_GET_PATH, DEFAULT_UPDATE_PATH};
pub use error::ClientError;
