//! HTTP API for entity listing and radius search.
//!
//! Routes:
//! - `GET /entities` list every entity
//! - `GET /entities/nearby` entities within a radius of a named entity
//! - `GET /health`, `GET /health/ready` liveness and readiness
//! - `GET /api/openapi.json` API document

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::geo::GeoQueryEngine;
use crate::repository::EntityStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GeoQueryEngine>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context()?;
        Ok(Self::with_store(ctx.store(), settings.clone()))
    }

    /// Build state around an existing store.
    pub fn with_store(store: Arc<dyn EntityStore>, settings: Settings) -> Self {
        Self {
            engine: Arc::new(GeoQueryEngine::new(store)),
            settings: Arc::new(settings),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
