//! Data models for geosearch.

mod entity;

pub use entity::{Entity, EntityRow, GeoRow, NearbyRow};
