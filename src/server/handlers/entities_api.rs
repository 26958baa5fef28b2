//! Entity listing and radius search endpoints.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::super::AppState;
use super::helpers::{deserialize_flag, query_params};
use crate::error::GeoResult;
use crate::geo::{EntitiesResponse, NearbyQuery, OutputFormat};

/// Query parameters for `GET /entities`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Return a GeoJSON FeatureCollection instead of flat records
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[param(value_type = Option<bool>)]
    pub geojson: bool,
}

/// Query parameters for `GET /entities/nearby`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyParams {
    /// Name of the reference entity
    #[param(min_length = 1)]
    pub entity: String,
    /// Search radius in meters
    #[param(minimum = 1)]
    pub range: i64,
    /// Return a GeoJSON FeatureCollection that also contains the reference entity
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[param(value_type = Option<bool>)]
    pub geojson: bool,
}

/// List every entity ordered by name.
#[utoipa::path(
    get,
    path = "/entities",
    params(ListParams),
    responses(
        (status = 200, description = "All entities as records or a FeatureCollection", body = EntitiesResponse),
        (status = 422, description = "Invalid query parameters"),
        (status = 500, description = "Database failure")
    ),
    tag = "Entities"
)]
pub async fn list_entities(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> GeoResult<Json<EntitiesResponse>> {
    let params = query_params(params)?;
    let response = state
        .engine
        .list_response(OutputFormat::from_flag(params.geojson))
        .await?;
    Ok(Json(response))
}

/// Find the entities within `range` meters of every entity named `entity`.
#[utoipa::path(
    get,
    path = "/entities/nearby",
    params(NearbyParams),
    responses(
        (status = 200, description = "Neighbors as records, or a FeatureCollection including the reference entity", body = EntitiesResponse),
        (status = 422, description = "Missing or invalid entity/range"),
        (status = 500, description = "Database failure")
    ),
    tag = "Entities"
)]
pub async fn nearby_entities(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> GeoResult<Json<EntitiesResponse>> {
    let params = query_params(params)?;
    let query = NearbyQuery::new(params.entity, params.range)?;
    let response = state
        .engine
        .nearby_response(&query, OutputFormat::from_flag(params.geojson))
        .await?;
    Ok(Json(response))
}
