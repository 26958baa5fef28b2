//! Shared helpers for request handlers.

use axum::extract::{rejection::QueryRejection, Query};
use serde::{Deserialize, Deserializer};

use crate::config::parse_flag;
use crate::error::{GeoError, GeoResult};

/// Serde adapter for [`parse_flag`].
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean flag '{}'", raw)))
}

/// Unwrap query parameters, turning a rejection into a validation error.
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> GeoResult<T> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| GeoError::Validation(rejection.body_text()))
}
