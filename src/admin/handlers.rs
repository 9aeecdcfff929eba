use axum::{extract::State, Json};
use serde::Serialize;

use crate::cache::Stats;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub sync_timeout_ms: u64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        sync_timeout_ms: u64::try_from(state.cache.sync_timeout().as_millis()).unwrap_or(u64::MAX),
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let cache = state.cache.clone();
    let stats = tokio::task::spawn_blocking(move || cache.stats()).await?;
    Ok(Json(stats))
}
