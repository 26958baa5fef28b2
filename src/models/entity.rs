//! Entity rows as they come back from the store.

use serde::{Deserialize, Serialize};

/// A stored named point with its position projected at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    /// Latitude (Y) in decimal degrees.
    pub lat: f64,
    /// Longitude (X) in decimal degrees.
    pub lon: f64,
}

impl Entity {
    pub fn new(id: i64, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Raw row produced by the list-all query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Serialized GeoJSON geometry, only selected when GeoJSON output is requested.
    pub geojson: Option<String>,
}

/// Raw row produced by a radius query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRow {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub geojson: Option<String>,
    /// Set only when the base rows are unioned into the result.
    pub is_base: Option<bool>,
}

/// Common view over rows the response shaper can consume.
pub trait GeoRow {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
    fn geojson(&self) -> Option<&str>;

    fn is_base(&self) -> Option<bool> {
        None
    }
}

impl GeoRow for EntityRow {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lon(&self) -> f64 {
        self.lon
    }
    fn geojson(&self) -> Option<&str> {
        self.geojson.as_deref()
    }
}

impl GeoRow for NearbyRow {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lon(&self) -> f64 {
        self.lon
    }
    fn geojson(&self) -> Option<&str> {
        self.geojson.as_deref()
    }
    fn is_base(&self) -> Option<bool> {
        self.is_base
    }
}
