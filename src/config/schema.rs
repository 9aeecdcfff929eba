//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the config-cache server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cache directory and freshness window.
    pub cache: CacheConfig,

    /// Endpoint paths and request limits.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding `<name>.json` documents.
    pub directory: String,

    /// Freshness window in milliseconds.
    pub sync_timeout_ms: u64,
}

impl CacheConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: "./configs".to_string(),
            sync_timeout_ms: 60_000,
        }
    }
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Path serving cached documents.
    pub get_path: String,

    /// Path accepting document updates.
    pub update_path: String,

    /// Maximum accepted request body in bytes.
    pub body_limit_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            get_path: "/v1/config/get".to_string(),
            update_path: "/v1/config/update".to_string(),
            body_limit_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on admin routes. Unset means open.
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [cache]
            directory = "/srv/configs"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.directory, "/srv/configs");
        assert_eq!(config.cache.sync_timeout_ms, 60_000);
        assert_eq!(config.http.get_path, "/v1/config/get");
        assert_eq!(config.http.update_path, "/v1/config/update");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn test_full_config() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [cache]
            directory = "data"
            sync_timeout_ms = 250

            [http]
            get_path = "/get"
            update_path = "/put"
            body_limit_bytes = 1024
            request_timeout_secs = 5

            [observability]
            log_level = "debug"
            log_format = "json"

            [admin]
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.sync_timeout_ms, 250);
        assert_eq!(config.http.body_limit_bytes, 1024);
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
    }
}
