//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the get/update handlers and admin routes
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::map_response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::cache::{CancelToken, ConfigCache};
use crate::config::{AdminConfig, ServerConfig};
use crate::http::error::json_error_responses;
use crate::http::handlers::{get_config, update_config};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ConfigCache>,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancelToken,
    pub admin: AdminConfig,
}

/// HTTP server exposing a [`ConfigCache`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    shutdown: CancelToken,
}

impl HttpServer {
    /// Create a new HTTP server over `cache`.
    ///
    /// `shutdown` stops the server and cancels cache work not yet started.
    pub fn new(config: ServerConfig, cache: Arc<ConfigCache>, shutdown: CancelToken) -> Self {
        let state = AppState {
            cache,
            shutdown: shutdown.clone(),
            admin: config.admin.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            shutdown,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let http = &config.http;
        Router::new()
            .route(&http.get_path, get(get_config).post(get_config))
            .route(&http.update_path, post(update_config))
            .with_state(state.clone())
            .merge(setup_admin_router(state))
            .layer(DefaultBodyLimit::max(http.body_limit_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(http.request_timeout_secs)))
            .layer(map_response(json_error_responses))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            get_path = %self.config.http.get_path,
            update_path = %self.config.http.update_path,
            "HTTP server starting"
        );

        let shutdown = self.shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
