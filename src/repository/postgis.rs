//! PostGIS-backed entity store.
//!
//! Positions live in `rj_entities.geom` (geometry, SRID 4326). Radius tests
//! cast to geography so `ST_DWithin` compares meters on the spheroid rather
//! than degrees on the plane.

use async_trait::async_trait;
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text};
use diesel_async::RunQueryDsl;

use super::pool::{DieselError, PgPool};
use super::store::EntityStore;
use crate::models::{EntityRow, NearbyRow};

const LIST_SQL: &str = r#"
    SELECT id::bigint AS id,
           name,
           ST_Y(geom) AS lat,
           ST_X(geom) AS lon,
           NULL::text AS geojson,
           NULL::boolean AS is_base
    FROM public.rj_entities
    ORDER BY name
"#;

const LIST_WITH_GEOMETRY_SQL: &str = r#"
    SELECT id::bigint AS id,
           name,
           ST_Y(geom) AS lat,
           ST_X(geom) AS lon,
           ST_AsGeoJSON(geom) AS geojson,
           NULL::boolean AS is_base
    FROM public.rj_entities
    ORDER BY name
"#;

const NEARBY_SQL: &str = r#"
    SELECT e2.id::bigint AS id,
           e2.name,
           ST_Y(e2.geom) AS lat,
           ST_X(e2.geom) AS lon,
           NULL::text AS geojson,
           NULL::boolean AS is_base
    FROM public.rj_entities e1
    JOIN public.rj_entities e2
      ON ST_DWithin(e1.geom::geography, e2.geom::geography, $2)
    WHERE e1.name = $1
      AND e2.name <> e1.name
"#;

const NEARBY_WITH_BASE_SQL: &str = r#"
    WITH base AS (
        SELECT id, name, geom
        FROM public.rj_entities
        WHERE name = $1
    )
    SELECT id, name, lat, lon, geojson, is_base
    FROM (
        SELECT 0 AS part,
               e2.id::bigint AS id,
               e2.name,
               ST_Y(e2.geom) AS lat,
               ST_X(e2.geom) AS lon,
               ST_AsGeoJSON(e2.geom) AS geojson,
               false AS is_base
        FROM base e1
        JOIN public.rj_entities e2
          ON ST_DWithin(e1.geom::geography, e2.geom::geography, $2)
        WHERE e2.name <> e1.name
        UNION ALL
        SELECT 1 AS part,
               e1.id::bigint AS id,
               e1.name,
               ST_Y(e1.geom) AS lat,
               ST_X(e1.geom) AS lon,
               ST_AsGeoJSON(e1.geom) AS geojson,
               true AS is_base
        FROM base e1
    ) combined
    ORDER BY part
"#;

#[derive(diesel::QueryableByName)]
struct GeoRecord {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Double)]
    lat: f64,
    #[diesel(sql_type = Double)]
    lon: f64,
    #[diesel(sql_type = Nullable<Text>)]
    geojson: Option<String>,
    #[diesel(sql_type = Nullable<Bool>)]
    is_base: Option<bool>,
}

impl From<GeoRecord> for EntityRow {
    fn from(r: GeoRecord) -> Self {
        EntityRow {
            id: r.id,
            name: r.name,
            lat: r.lat,
            lon: r.lon,
            geojson: r.geojson,
        }
    }
}

impl From<GeoRecord> for NearbyRow {
    fn from(r: GeoRecord) -> Self {
        NearbyRow {
            id: r.id,
            name: r.name,
            lat: r.lat,
            lon: r.lon,
            geojson: r.geojson,
            is_base: r.is_base,
        }
    }
}

/// Entity store running spatial SQL against PostGIS.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn list_entities(&self, with_geometry: bool) -> Result<Vec<EntityRow>, DieselError> {
        let sql = if with_geometry {
            LIST_WITH_GEOMETRY_SQL
        } else {
            LIST_SQL
        };

        let mut conn = self.pool.get().await?;
        let rows: Vec<GeoRecord> = diesel::sql_query(sql).load(&mut conn).await?;
        Ok(rows.into_iter().map(EntityRow::from).collect())
    }

    async fn find_nearby(
        &self,
        entity: &str,
        radius_meters: u32,
        include_base: bool,
    ) -> Result<Vec<NearbyRow>, DieselError> {
        let sql = if include_base {
            NEARBY_WITH_BASE_SQL
        } else {
            NEARBY_SQL
        };

        let mut conn = self.pool.get().await?;
        let rows: Vec<GeoRecord> = diesel::sql_query(sql)
            .bind::<Text, _>(entity)
            .bind::<Double, _>(f64::from(radius_meters))
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(NearbyRow::from).collect())
    }

    async fn ping(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::PoolOptions;

    fn squash(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_list_sql() {
        for sql in [LIST_SQL, LIST_WITH_GEOMETRY_SQL] {
            let sql = squash(sql);
            assert!(sql.contains("FROM public.rj_entities"));
            assert!(sql.contains("ST_Y(geom) AS lat"));
            assert!(sql.contains("ST_X(geom) AS lon"));
            assert!(sql.ends_with("ORDER BY name"));
        }
        assert!(!LIST_SQL.contains("ST_AsGeoJSON"));
        assert!(LIST_WITH_GEOMETRY_SQL.contains("ST_AsGeoJSON(geom) AS geojson"));
    }

    #[test]
    fn test_nearby_sql_measures_geography() {
        for sql in [NEARBY_SQL, NEARBY_WITH_BASE_SQL] {
            let sql = squash(sql);
            assert!(
                sql.contains("ST_DWithin(e1.geom::geography, e2.geom::geography, $2)"),
                "{}",
                sql
            );
            assert_eq!(sql.matches("ST_DWithin").count(), 1);
            assert!(sql.contains("e2.name <> e1.name"), "{}", sql);
        }
        assert!(squash(NEARBY_SQL).contains("WHERE e1.name = $1"));
        assert!(squash(NEARBY_WITH_BASE_SQL).contains("WHERE name = $1"));
    }

    #[test]
    fn test_nearby_with_base_orders_base_last() {
        let sql = squash(NEARBY_WITH_BASE_SQL);
        let neighbors = sql.find("SELECT 0 AS part").unwrap();
        let union = sql.find("UNION ALL").unwrap();
        let bases = sql.find("SELECT 1 AS part").unwrap();

        assert!(neighbors < union && union < bases);
        assert!(sql[neighbors..union].contains("false AS is_base"));
        assert!(sql[bases..].contains("true AS is_base"));
        assert!(sql.ends_with("ORDER BY part"));
        assert!(!NEARBY_SQL.contains("UNION"));
    }

    /// Needs a PostGIS database with `public.rj_entities`.
    ///
    /// Run with: DATABASE_URL=postgres://... cargo test two_point -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_two_point_scenario_against_postgis() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping");
            return;
        };
        let options = PoolOptions {
            no_tls: std::env::var("GEOSEARCH_NO_TLS").is_ok(),
            ..Default::default()
        };
        let store = PgEntityStore::new(PgPool::new(&url, &options).unwrap());

        let prefix = format!("geosearch-test-{}-", std::process::id());
        let a = format!("{}A", prefix);
        let b = format!("{}B", prefix);
        let base_id = 2_000_000_000 + i32::try_from(std::process::id() % 1000).unwrap() * 2;

        let mut conn = store.pool.get().await.unwrap();
        for (id, name, lat) in [(base_id, &a, 0.0), (base_id + 1, &b, 0.0009)] {
            diesel::sql_query(
                "INSERT INTO public.rj_entities (id, name, geom) \
                 VALUES ($1, $2, ST_SetSRID(ST_MakePoint($3, $4), 4326))",
            )
            .bind::<diesel::sql_types::Integer, _>(id)
            .bind::<Text, _>(name)
            .bind::<Double, _>(0.0)
            .bind::<Double, _>(lat)
            .execute(&mut conn)
            .await
            .unwrap();
        }

        let ours = |rows: Vec<NearbyRow>| -> Vec<NearbyRow> {
            rows.into_iter()
                .filter(|r| r.name.starts_with(&prefix))
                .collect()
        };

        let near = ours(store.find_nearby(&a, 150, false).await.unwrap());
        let far = ours(store.find_nearby(&a, 50, false).await.unwrap());
        let with_base = ours(store.find_nearby(&a, 150, true).await.unwrap());

        diesel::sql_query("DELETE FROM public.rj_entities WHERE name LIKE $1")
            .bind::<Text, _>(format!("{}%", prefix))
            .execute(&mut conn)
            .await
            .unwrap();

        assert_eq!(near.len(), 1);
        assert_eq!(near[0].name, b);
        assert!(near[0].is_base.is_none());
        assert!((near[0].lat - 0.0009).abs() < 1e-9);

        assert!(far.is_empty());

        assert_eq!(with_base.len(), 2);
        assert_eq!(with_base[0].name, b);
        assert_eq!(with_base[0].is_base, Some(false));
        assert_eq!(with_base[1].name, a);
        assert_eq!(with_base[1].is_base, Some(true));
        assert!(with_base.iter().all(|r| r.geojson.is_some()));
    }
}
