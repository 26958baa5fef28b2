//! Typed API response types for OpenAPI spec generation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::GeoError;

/// Message returned for every server-side failure. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Standard API response envelope.
///
/// Errors and status endpoints return this wrapper:
/// ```json
/// { "error": false, "context": {}, "data": { ... } }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<C: Serialize, T: Serialize> {
    pub error: bool,
    pub context: C,
    pub data: T,
}

/// Empty context for envelope responses.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct EmptyContext {}

/// Error payload inside the envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub message: String,
}

/// Readiness payload returned by `GET /health/ready`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyStatus {
    pub ready: bool,
    pub backend: String,
}

impl ApiResponse<EmptyContext, ErrorData> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ApiResponse {
                error: true,
                context: EmptyContext {},
                data: ErrorData {
                    message: message.into(),
                },
            }),
        )
            .into_response()
    }
}

impl<T: Serialize> ApiResponse<EmptyContext, T> {
    pub fn ok(data: T) -> Json<ApiResponse<EmptyContext, T>> {
        Json(ApiResponse {
            error: false,
            context: EmptyContext {},
            data,
        })
    }
}

/// Log a server-side failure and answer with an opaque 500.
pub fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("Request failed: {}", e);
    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

impl IntoResponse for GeoError {
    fn into_response(self) -> Response {
        match self {
            GeoError::Validation(message) => {
                ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            other => internal_error(other),
        }
    }
}
