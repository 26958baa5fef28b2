//! Geo query engine.
//!
//! Validates caller input, runs one of the two spatial queries against the
//! entity store and hands the rows to the response shaper.

use std::sync::Arc;

use super::shaper::{to_feature_collection, to_flat_records, EntitiesResponse};
use crate::error::{GeoError, GeoResult};
use crate::models::{EntityRow, NearbyRow};
use crate::repository::EntityStore;

/// Output contract requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Array of `{id, name, lat, lon}` records.
    #[default]
    Records,
    /// GeoJSON FeatureCollection.
    GeoJson,
}

impl OutputFormat {
    pub fn from_flag(geojson: bool) -> Self {
        if geojson {
            OutputFormat::GeoJson
        } else {
            OutputFormat::Records
        }
    }

    pub fn is_geojson(self) -> bool {
        self == OutputFormat::GeoJson
    }
}

/// A validated radius query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyQuery {
    entity: String,
    radius_meters: u32,
}

impl NearbyQuery {
    /// Validate a radius query: the entity name must be non-empty and the
    /// radius a positive whole number of meters.
    pub fn new(entity: impl Into<String>, radius_meters: i64) -> GeoResult<Self> {
        let entity = entity.into();
        if entity.is_empty() {
            return Err(GeoError::Validation(
                "entity must be at least 1 character".to_string(),
            ));
        }
        if radius_meters < 1 {
            return Err(GeoError::Validation(format!(
                "range must be greater than or equal to 1, got {}",
                radius_meters
            )));
        }
        let radius_meters = u32::try_from(radius_meters).map_err(|_| {
            GeoError::Validation(format!(
                "range must be at most {} meters, got {}",
                u32::MAX,
                radius_meters
            ))
        })?;

        Ok(Self {
            entity,
            radius_meters,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn radius_meters(&self) -> u32 {
        self.radius_meters
    }
}

/// Runs entity queries against a shared store.
#[derive(Clone)]
pub struct GeoQueryEngine {
    store: Arc<dyn EntityStore>,
}

impl GeoQueryEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Every entity ordered by name.
    pub async fn list_entities(&self, with_geometry: bool) -> GeoResult<Vec<EntityRow>> {
        Ok(self.store.list_entities(with_geometry).await?)
    }

    /// Neighbors of the named entity within the query radius.
    ///
    /// An unknown entity yields an empty result, not an error.
    pub async fn find_nearby(
        &self,
        query: &NearbyQuery,
        include_base: bool,
    ) -> GeoResult<Vec<NearbyRow>> {
        Ok(self
            .store
            .find_nearby(query.entity(), query.radius_meters(), include_base)
            .await?)
    }

    /// List-all shaped for the requested output format.
    pub async fn list_response(&self, format: OutputFormat) -> GeoResult<EntitiesResponse> {
        let rows = self.list_entities(format.is_geojson()).await?;
        shape(&rows, format)
    }

    /// Radius query shaped for the requested output format.
    ///
    /// GeoJSON output also carries the base rows tagged `is_base = true`;
    /// flat records only ever contain neighbors.
    pub async fn nearby_response(
        &self,
        query: &NearbyQuery,
        format: OutputFormat,
    ) -> GeoResult<EntitiesResponse> {
        let rows = self.find_nearby(query, format.is_geojson()).await?;
        tracing::debug!(
            entity = query.entity(),
            radius_meters = query.radius_meters(),
            rows = rows.len(),
            "nearby query"
        );
        shape(&rows, format)
    }
}

fn shape<R: crate::models::GeoRow>(
    rows: &[R],
    format: OutputFormat,
) -> GeoResult<EntitiesResponse> {
    match format {
        OutputFormat::Records => Ok(EntitiesResponse::Records(to_flat_records(rows))),
        OutputFormat::GeoJson => Ok(EntitiesResponse::Features(to_feature_collection(rows)?)),
    }
}
