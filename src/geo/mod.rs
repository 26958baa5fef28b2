//! Proximity queries and response shaping.

pub mod distance;
pub mod geojson;
pub mod query;
pub mod shaper;

pub use geojson::{Feature, FeatureCollection, FeatureProperties, Geometry};
pub use query::{GeoQueryEngine, NearbyQuery, OutputFormat};
pub use shaper::{to_feature_collection, to_flat_records, EntitiesResponse, EntityRecord};
