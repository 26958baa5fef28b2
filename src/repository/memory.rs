//! In-memory entity store.
//!
//! Holds a fixed set of points loaded at startup (`memory:` or
//! `memory:<path>` database URLs). Distances use the haversine formula, so
//! radius results match PostGIS geography queries to within the
//! sphere/spheroid difference.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::pool::DieselError;
use super::store::EntityStore;
use super::util::to_diesel_error;
use crate::geo::distance::haversine_meters;
use crate::geo::geojson::Geometry;
use crate::models::{Entity, EntityRow, NearbyRow};

/// Entity store backed by a vector of points.
///
/// Listing sorts names by byte order. PostGIS sorts by the database
/// collation, so mixed-case names (`"a"` vs `"B"`) can come back in a
/// different order from the two backends.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityStore {
    entities: Vec<Entity>,
}

/// Seed file formats accepted by [`MemoryEntityStore::from_file`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Records(Vec<Entity>),
    Collection(SeedCollection),
}

#[derive(Debug, Deserialize)]
struct SeedCollection {
    features: Vec<SeedFeature>,
}

#[derive(Debug, Deserialize)]
struct SeedFeature {
    geometry: Geometry,
    properties: SeedProperties,
}

#[derive(Debug, Deserialize)]
struct SeedProperties {
    id: i64,
    name: String,
}

impl MemoryEntityStore {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Load entities from a JSON file.
    ///
    /// Accepts either an array of `{id, name, lat, lon}` records or a GeoJSON
    /// FeatureCollection of points with `id` and `name` properties.
    pub fn from_file(path: &Path) -> Result<Self, DieselError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            to_diesel_error(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse seed JSON (see [`MemoryEntityStore::from_file`]).
    pub fn from_json(contents: &str) -> Result<Self, DieselError> {
        let seed: SeedFile = serde_json::from_str(contents)
            .map_err(|e| to_diesel_error(format!("Invalid seed data: {}", e)))?;

        let entities = match seed {
            SeedFile::Records(entities) => entities,
            SeedFile::Collection(collection) => collection
                .features
                .into_iter()
                .map(|feature| match feature.geometry.as_lat_lon() {
                    Some((lat, lon)) => Ok(Entity::new(
                        feature.properties.id,
                        feature.properties.name,
                        lat,
                        lon,
                    )),
                    None => Err(to_diesel_error(format!(
                        "Seed feature {} is not a point",
                        feature.properties.id
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self::new(entities))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn geometry_text(entity: &Entity) -> String {
        Geometry::point(entity.lat, entity.lon).to_json_string()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn list_entities(&self, with_geometry: bool) -> Result<Vec<EntityRow>, DieselError> {
        let mut sorted: Vec<&Entity> = self.entities.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(sorted
            .into_iter()
            .map(|e| EntityRow {
                id: e.id,
                name: e.name.clone(),
                lat: e.lat,
                lon: e.lon,
                geojson: with_geometry.then(|| Self::geometry_text(e)),
            })
            .collect())
    }

    async fn find_nearby(
        &self,
        entity: &str,
        radius_meters: u32,
        include_base: bool,
    ) -> Result<Vec<NearbyRow>, DieselError> {
        let radius = f64::from(radius_meters);
        let bases: Vec<&Entity> = self.entities.iter().filter(|e| e.name == entity).collect();

        let mut rows = Vec::new();
        for base in &bases {
            for other in &self.entities {
                if other.name == base.name {
                    continue;
                }
                if haversine_meters(base.lat, base.lon, other.lat, other.lon) > radius {
                    continue;
                }
                rows.push(NearbyRow {
                    id: other.id,
                    name: other.name.clone(),
                    lat: other.lat,
                    lon: other.lon,
                    geojson: include_base.then(|| Self::geometry_text(other)),
                    is_base: include_base.then_some(false),
                });
            }
        }

        if include_base {
            rows.extend(bases.iter().map(|base| NearbyRow {
                id: base.id,
                name: base.name.clone(),
                lat: base.lat,
                lon: base.lon,
                geojson: Some(Self::geometry_text(base)),
                is_base: Some(true),
            }));
        }

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), DieselError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_store() -> MemoryEntityStore {
        MemoryEntityStore::new(vec![
            Entity::new(1, "A", 0.0, 0.0),
            Entity::new(2, "B", 0.0009, 0.0),
            Entity::new(3, "C", 0.01, 0.0),
        ])
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let store = MemoryEntityStore::new(vec![
            Entity::new(1, "Urca", 0.0, 0.0),
            Entity::new(2, "Botafogo", 0.0, 0.0),
            Entity::new(3, "Leme", 0.0, 0.0),
        ]);
        let names: Vec<String> = store
            .list_entities(false)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Botafogo", "Leme", "Urca"]);
    }

    #[tokio::test]
    async fn test_list_geometry_only_when_requested() {
        let store = sample_store();
        assert!(store
            .list_entities(false)
            .await
            .unwrap()
            .iter()
            .all(|r| r.geojson.is_none()));
        assert!(store
            .list_entities(true)
            .await
            .unwrap()
            .iter()
            .all(|r| r.geojson.is_some()));
    }

    #[tokio::test]
    async fn test_nearby_excludes_base_and_far_points() {
        let store = sample_store();
        let rows = store.find_nearby("A", 150, false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[0].is_base, None);
        assert_eq!(rows[0].geojson, None);

        assert!(store.find_nearby("A", 50, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nearby_with_base_appends_base_rows() {
        let store = sample_store();
        let rows = store.find_nearby("A", 150, true).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].name.as_str(), rows[0].is_base), ("B", Some(false)));
        assert_eq!((rows[1].name.as_str(), rows[1].is_base), ("A", Some(true)));
        assert!(rows.iter().all(|r| r.geojson.is_some()));
    }

    #[tokio::test]
    async fn test_nearby_unknown_entity_is_empty() {
        let store = sample_store();
        assert!(store.find_nearby("Nowhere", 10_000, true).await.unwrap().is_empty());
    }

    #[test]
    fn test_seed_from_records() {
        let store = MemoryEntityStore::from_json(
            r#"[{"id":1,"name":"Cristo Redentor","lat":-22.9519,"lon":-43.2105}]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seed_from_feature_collection_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","geometry":{{"type":"Point","coordinates":[-43.1729,-22.9068]}},
                  "properties":{{"id":5,"name":"Centro"}}}}
            ]}}"#
        )
        .unwrap();

        let store = MemoryEntityStore::from_file(file.path()).unwrap();
        assert_eq!(store.entities[0], Entity::new(5, "Centro", -22.9068, -43.1729));
    }

    #[test]
    fn test_seed_rejects_non_point_feature() {
        let err = MemoryEntityStore::from_json(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},
                 "properties":{"id":1,"name":"Line"}}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a point"));
    }
}
