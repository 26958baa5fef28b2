//! Health endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::super::AppState;
use super::api_types::{ApiResponse, ReadyStatus};

/// Health check endpoint for container orchestration.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is alive")),
    tag = "Health"
)]
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness check: the store must answer a probe query.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Store reachable", body = ReadyStatus),
        (status = 503, description = "Store unreachable")
    ),
    tag = "Health"
)]
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.engine.store();
    match store.ping().await {
        Ok(()) => ApiResponse::ok(ReadyStatus {
            ready: true,
            backend: store.backend_name().to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Readiness probe failed: {}", e);
            ApiResponse::error(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
        }
    }
}
