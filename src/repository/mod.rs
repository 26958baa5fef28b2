//! Repository layer for entity storage.
//!
//! The PostGIS store runs raw spatial SQL through Diesel's async PostgreSQL
//! connections. An in-memory store with the same semantics backs offline use
//! and tests.

pub mod context;
pub mod memory;
#[cfg(feature = "postgres")]
mod pg_tls;
pub mod pool;
#[cfg(feature = "postgres")]
pub mod postgis;
pub mod store;
pub mod util;

pub use context::DbContext;
pub use memory::MemoryEntityStore;
#[cfg(feature = "postgres")]
pub use pool::PgPool;
pub use pool::{DieselError, PoolOptions};
#[cfg(feature = "postgres")]
pub use postgis::PgEntityStore;
pub use store::EntityStore;
