//! Get and update endpoints.
//!
//! Cache calls block on a lock and on file I/O, so they run on the blocking
//! pool. The shutdown token is passed through so queued work is abandoned
//! once the server is stopping.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Query string accepted by both endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigQuery {
    pub config: Option<String>,
}

/// JSON body form of the get request.
#[derive(Debug, Deserialize)]
struct ConfigRequest {
    config: String,
}

/// `GET|POST <get_path>?config=<name>` or body `{"config": "<name>"}`.
pub async fn get_config(
    State(state): State<AppState>,
    query: Result<Query<ConfigQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let response = match serve_get(&state, query, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(status = %e.status, error = %e.message, "Get request failed");
            e.into_response()
        }
    };
    metrics::record_request("get", response.status().as_u16());
    response
}

/// `POST <update_path>?config=<name>` with the new document as body.
pub async fn update_config(
    State(state): State<AppState>,
    query: Result<Query<ConfigQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let response = match serve_update(&state, query, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(status = %e.status, error = %e.message, "Update request failed");
            e.into_response()
        }
    };
    metrics::record_request("update", response.status().as_u16());
    response
}

async fn serve_get(
    state: &AppState,
    query: Result<Query<ConfigQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let name = match query_name(query)? {
        Some(name) => name,
        None => body_name(&read_body(body)?)?,
    };

    let cache = state.cache.clone();
    let cancel = state.shutdown.clone();
    let data = tokio::task::spawn_blocking(move || cache.get_cancellable(&name, &cancel)).await??;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        data,
    )
        .into_response())
}

async fn serve_update(
    state: &AppState,
    query: Result<Query<ConfigQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let name = query_name(query)?
        .ok_or_else(|| ApiError::bad_request("config name is required in the query string"))?;
    let data = read_body(body)?;
    if serde_json::from_slice::<serde::de::IgnoredAny>(&data).is_err() {
        return Err(ApiError::bad_request("config sent is invalid as json"));
    }

    let cache = state.cache.clone();
    let cancel = state.shutdown.clone();
    tokio::task::spawn_blocking(move || cache.update_cancellable(&name, &data, &cancel)).await??;

    Ok(StatusCode::OK.into_response())
}

fn query_name(query: Result<Query<ConfigQuery>, QueryRejection>) -> Result<Option<String>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(query.config.filter(|name| !name.trim().is_empty()))
}

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|e| ApiError {
        status: e.status(),
        message: e.body_text(),
    })
}

fn body_name(body: &[u8]) -> Result<String, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("config name is required"));
    }
    let request: ConfigRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    if request.config.trim().is_empty() {
        return Err(ApiError::bad_request("config name is required"));
    }
    Ok(request.config)
}
