//! Pluggable entity store trait.
//!
//! The PostGIS store is the production backend; the in-memory store carries
//! the same query semantics for offline use and tests.

use async_trait::async_trait;

use super::pool::DieselError;
use crate::models::{EntityRow, NearbyRow};

/// Read-only access to the named point table.
///
/// Implementations must be thread-safe; one instance is shared by all requests.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Every entity ordered by name. Serialized geometry is selected only
    /// when `with_geometry` is set.
    async fn list_entities(&self, with_geometry: bool) -> Result<Vec<EntityRow>, DieselError>;

    /// Entities within `radius_meters` of every row named `entity`, excluding
    /// rows sharing the base row's name.
    ///
    /// With `include_base`, neighbors are tagged `is_base = false`, carry
    /// serialized geometry, and are followed by the base rows tagged
    /// `is_base = true`.
    async fn find_nearby(
        &self,
        entity: &str,
        radius_meters: u32,
        include_base: bool,
    ) -> Result<Vec<NearbyRow>, DieselError>;

    /// Cheap round trip to check the store is reachable.
    async fn ping(&self) -> Result<(), DieselError>;

    /// Backend name for logs.
    fn backend_name(&self) -> &'static str;
}
