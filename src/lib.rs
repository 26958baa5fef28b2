//! GeoSearch - proximity search over named geographic points.
//!
//! Serves a read-only HTTP API over the PostGIS table `public.rj_entities`:
//! list every entity, or find the entities within a radius of a named one,
//! as flat records or GeoJSON.

pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod repository;
pub mod server;

pub use error::{GeoError, GeoResult};
