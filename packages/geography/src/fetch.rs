//! One-shot download of geographic source documents.
//!
//! The session loads each document exactly once at startup; there is no
//! retry or backoff, and a failed fetch is fatal to the whole session.

use aqi_map_geography_models::GeoFeature;

use crate::{GeoError, features_from_geojson};

/// Downloads and parses a GeoJSON feature collection.
///
/// # Errors
///
/// Returns [`GeoError`] if the request fails, the server responds with an
/// error status, or the body is not a usable feature collection.
pub async fn fetch_features(url: &str) -> Result<Vec<GeoFeature>, GeoError> {
    log::info!("Fetching geographic source: {url}");
    let body = reqwest::get(url).await?.error_for_status()?.text().await?;
    let features = features_from_geojson(&body)?;
    log::info!("Fetched {} features from {url}", features.len());
    Ok(features)
}
