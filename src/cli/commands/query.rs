//! One-shot query commands that print JSON to stdout.

use crate::config::Settings;
use crate::geo::{EntitiesResponse, GeoQueryEngine, NearbyQuery, OutputFormat};

fn engine(settings: &Settings) -> anyhow::Result<GeoQueryEngine> {
    let ctx = settings.create_db_context()?;
    Ok(GeoQueryEngine::new(ctx.store()))
}

fn print_response(response: &EntitiesResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

/// Print every entity.
pub async fn cmd_list(settings: &Settings, geojson: bool) -> anyhow::Result<()> {
    let engine = engine(settings)?;
    let response = engine
        .list_response(OutputFormat::from_flag(geojson))
        .await?;
    tracing::info!("Listed {} entities", response.len());
    print_response(&response)
}

/// Print the neighbors of `entity` within `range` meters.
pub async fn cmd_nearby(
    settings: &Settings,
    entity: &str,
    range: i64,
    geojson: bool,
) -> anyhow::Result<()> {
    let query = NearbyQuery::new(entity, range)?;
    let engine = engine(settings)?;
    let response = engine
        .nearby_response(&query, OutputFormat::from_flag(geojson))
        .await?;
    if response.is_empty() {
        tracing::info!("No entities within {}m of '{}'", range, entity);
    }
    print_response(&response)
}
