//! OpenAPI spec generation and serving.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use utoipa::OpenApi;

use super::super::AppState;
use super::api;
use super::api_types;
use super::entities_api;
use crate::config::Settings;
use crate::geo;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::ready,
        entities_api::list_entities,
        entities_api::nearby_entities,
    ),
    components(schemas(
        api_types::EmptyContext,
        api_types::ErrorData,
        api_types::ReadyStatus,
        geo::EntityRecord,
        geo::EntitiesResponse,
        geo::FeatureCollection,
        geo::Feature,
        geo::FeatureProperties,
    )),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Entities", description = "Entity listing and radius search"),
    )
)]
struct ApiDoc;

/// Build the OpenAPI document with service info taken from settings.
pub fn api_doc(settings: &Settings) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = settings.app_name.clone();
    doc.info.version = settings.app_version.clone();
    let description = settings.description();
    doc.info.description = (!description.is_empty()).then(|| description.to_string());
    doc
}

/// Serve the OpenAPI spec as JSON.
pub async fn openapi_spec(State(state): State<AppState>) -> impl IntoResponse {
    let spec = api_doc(&state.settings)
        .to_json()
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
    (StatusCode::OK, [("content-type", "application/json")], spec)
}
