//! Response shaping: raw rows into flat records or GeoJSON.
//!
//! Both shapes are pure projections of the input rows and keep their order.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geojson::{Feature, FeatureCollection, FeatureProperties, Geometry};
use crate::error::{GeoError, GeoResult};
use crate::models::GeoRow;

/// Flat entity record returned when GeoJSON is not requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntityRecord {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Either output contract of the entity endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum EntitiesResponse {
    Records(Vec<EntityRecord>),
    Features(FeatureCollection),
}

impl EntitiesResponse {
    /// Number of records or features carried.
    pub fn len(&self) -> usize {
        match self {
            EntitiesResponse::Records(records) => records.len(),
            EntitiesResponse::Features(fc) => fc.features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Project rows onto `{id, name, lat, lon}`.
pub fn to_flat_records<R: GeoRow>(rows: &[R]) -> Vec<EntityRecord> {
    rows.iter()
        .map(|row| EntityRecord {
            id: row.id(),
            name: row.name().to_string(),
            lat: row.lat(),
            lon: row.lon(),
        })
        .collect()
}

/// Build a FeatureCollection, parsing each row's serialized geometry.
///
/// Rows without an `is_base` flag (the list-all path) are tagged `false`.
pub fn to_feature_collection<R: GeoRow>(rows: &[R]) -> GeoResult<FeatureCollection> {
    let features = rows
        .iter()
        .map(to_feature)
        .collect::<GeoResult<Vec<_>>>()?;
    Ok(FeatureCollection::new(features))
}

fn to_feature<R: GeoRow>(row: &R) -> GeoResult<Feature> {
    let text = row.geojson().ok_or_else(|| GeoError::MalformedGeometry {
        id: row.id(),
        reason: "row carries no geometry".to_string(),
    })?;

    let geometry = Geometry::parse(text).map_err(|reason| GeoError::MalformedGeometry {
        id: row.id(),
        reason,
    })?;

    Ok(Feature::new(
        geometry,
        FeatureProperties {
            id: row.id(),
            name: row.name().to_string(),
            lat: row.lat(),
            lon: row.lon(),
            is_base: row.is_base().unwrap_or(false),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityRow, NearbyRow};

    fn entity_row(id: i64, name: &str, lat: f64, lon: f64) -> EntityRow {
        EntityRow {
            id,
            name: name.to_string(),
            lat,
            lon,
            geojson: Some(Geometry::point(lat, lon).to_json_string()),
        }
    }

    fn nearby_row(id: i64, name: &str, lat: f64, lon: f64, is_base: bool) -> NearbyRow {
        NearbyRow {
            id,
            name: name.to_string(),
            lat,
            lon,
            geojson: Some(Geometry::point(lat, lon).to_json_string()),
            is_base: Some(is_base),
        }
    }

    #[test]
    fn test_flat_records_preserve_order() {
        let rows = vec![
            entity_row(3, "Zoo", 1.0, 2.0),
            entity_row(1, "Arpoador", 3.0, 4.0),
        ];
        let records = to_flat_records(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Zoo");
        assert_eq!(records[1].id, 1);
        assert_eq!((records[1].lat, records[1].lon), (3.0, 4.0));
    }

    #[test]
    fn test_list_rows_default_is_base_false() {
        let rows = vec![entity_row(1, "A", 0.0, 0.0), entity_row(2, "B", 0.0009, 0.0)];
        let fc = to_feature_collection(&rows).unwrap();
        assert_eq!(fc.kind, "FeatureCollection");
        assert!(fc.features.iter().all(|f| !f.properties.is_base));
    }

    #[test]
    fn test_nearby_rows_keep_is_base() {
        let rows = vec![
            nearby_row(2, "B", 0.0009, 0.0, false),
            nearby_row(1, "A", 0.0, 0.0, true),
        ];
        let fc = to_feature_collection(&rows).unwrap();
        let flags: Vec<bool> = fc.features.iter().map(|f| f.properties.is_base).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_shapes_agree_on_coordinates() {
        let rows = vec![
            nearby_row(1, "A", -22.9519, -43.2105, false),
            nearby_row(2, "B", -22.9068, -43.1729, true),
        ];
        let records = to_flat_records(&rows);
        let fc = to_feature_collection(&rows).unwrap();

        for (record, feature) in records.iter().zip(&fc.features) {
            assert_eq!(record.lat, feature.properties.lat);
            assert_eq!(record.lon, feature.properties.lon);
            assert_eq!(
                feature.geometry.as_lat_lon(),
                Some((record.lat, record.lon))
            );
        }
    }

    #[test]
    fn test_malformed_geometry() {
        let mut row = entity_row(9, "Broken", 0.0, 0.0);
        row.geojson = Some("{\"type\":".to_string());
        match to_feature_collection(&[row]) {
            Err(GeoError::MalformedGeometry { id, .. }) => assert_eq!(id, 9),
            other => panic!("expected MalformedGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_geometry_is_malformed() {
        let mut row = entity_row(4, "NoGeom", 0.0, 0.0);
        row.geojson = None;
        assert!(matches!(
            to_feature_collection(&[row]),
            Err(GeoError::MalformedGeometry { id: 4, .. })
        ));
    }

    #[test]
    fn test_untagged_response_serialization() {
        let flat = EntitiesResponse::Records(to_flat_records(&[entity_row(1, "A", 0.0, 0.0)]));
        let json = serde_json::to_value(&flat).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "A");
        assert!(json[0].get("is_base").is_none());

        let features = EntitiesResponse::Features(FeatureCollection::new(vec![]));
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert!(features.is_empty());
    }
}
