//! HTTP request handlers for the web server.

mod api;
mod api_types;
mod entities_api;
mod helpers;
mod openapi;

// Re-export handlers for use by the router
pub use api::{health, ready};
pub use entities_api::{list_entities, nearby_entities};
pub use openapi::openapi_spec;
