//! config-cache server.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET/POST /v1/config/get        ┌──────────────┐      ┌────────────────────┐
//!     ──────────────────────────────▶│  http        │─────▶│  cache             │
//!     POST /v1/config/update         │  handlers    │      │  (RwLock<map>)     │
//!     ──────────────────────────────▶│              │      └─────────┬──────────┘
//!                                    └──────────────┘                │ stat / read / write
//!     GET /admin/{status,stats}      ┌──────────────┐                ▼
//!     ──────────────────────────────▶│  admin       │      <directory>/<name>.json
//!                                    └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use config_cache::cache::ConfigCache;
use config_cache::config::{resolve_config, ConfigOverrides};
use config_cache::http::HttpServer;
use config_cache::lifecycle::{signals, Shutdown};
use config_cache::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "config-cache")]
#[command(about = "Serve JSON config documents from a directory", long_about = None)]
struct Args {
    /// TOML server configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `cache.directory`.
    #[arg(short, long)]
    directory: Option<String>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `cache.sync_timeout_ms`.
    #[arg(long)]
    sync_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        directory: args.directory,
        bind_address: args.bind,
        sync_timeout_ms: args.sync_timeout_ms,
    };
    let config = resolve_config(args.config.as_deref(), overrides)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("config-cache v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        directory = %config.cache.directory,
        sync_timeout_ms = config.cache.sync_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let cache = Arc::new(
        ConfigCache::new(&config.cache.directory).with_sync_timeout(config.cache.sync_timeout()),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, cache, shutdown.subscribe());
    let server_task = tokio::spawn(server.run(listener));

    signals::wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
