//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level. `format = "json"` switches the
//! fmt layer to one JSON object per line.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Install the global subscriber.
///
/// # Errors
/// Fails if a global subscriber was already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("config_cache={},tower_http=info", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        _ => registry.with(fmt::layer().with_target(true)).try_init(),
    }
}
