//! GeoJSON envelope types.
//!
//! Geometry comes out of the store as serialized text (`ST_AsGeoJSON`) and is
//! parsed into [`Geometry`] before being embedded in a [`Feature`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A GeoJSON position: `[lon, lat]` or `[lon, lat, alt]`.
pub type Position = Vec<f64>;

/// Typed GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Point geometry from a latitude/longitude pair.
    pub fn point(lat: f64, lon: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lon, lat],
        }
    }

    /// Parse serialized GeoJSON geometry text.
    pub fn parse(text: &str) -> Result<Self, String> {
        let geometry: Geometry = serde_json::from_str(text).map_err(|e| e.to_string())?;
        geometry.validate()?;
        Ok(geometry)
    }

    /// Serialize back to GeoJSON text.
    pub fn to_json_string(&self) -> String {
        // Only finite floats and strings inside, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Check that every position carries at least two finite coordinates.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Geometry::Point { coordinates } => check_position(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().try_for_each(|p| check_position(p))
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates
                    .iter()
                    .flatten()
                    .try_for_each(|p| check_position(p))
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .flatten()
                .try_for_each(|p| check_position(p)),
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().try_for_each(Geometry::validate)
            }
        }
    }

    /// `(lat, lon)` of a point geometry.
    pub fn as_lat_lon(&self) -> Option<(f64, f64)> {
        match self {
            Geometry::Point { coordinates } => match coordinates.as_slice() {
                [lon, lat, ..] => Some((*lat, *lon)),
                _ => None,
            },
            _ => None,
        }
    }
}

fn check_position(position: &[f64]) -> Result<(), String> {
    if position.len() < 2 {
        return Err(format!(
            "position needs at least 2 coordinates, got {}",
            position.len()
        ));
    }
    if position.iter().any(|c| !c.is_finite()) {
        return Err("position contains a non-finite coordinate".to_string());
    }
    Ok(())
}

/// Fixed property record attached to every feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureProperties {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// True when the feature is the reference point of a radius query.
    pub is_base: bool,
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Feature {
    #[serde(rename = "type")]
    #[schema(example = "Feature")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: FeatureProperties) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    #[schema(example = "FeatureCollection")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
