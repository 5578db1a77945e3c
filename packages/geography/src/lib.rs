#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic source loading and region indexing.
//!
//! Loads the state and county polygon documents (GeoJSON feature
//! collections) and reconciles their two disjoint code spaces: state
//! features carry a two-digit FIPS code, county features a five-digit one
//! whose leading two digits identify the parent state. The index is built
//! once after both sources have loaded and is read-only afterwards.

pub mod fetch;

use std::collections::BTreeMap;
use std::path::Path;

use aqi_map_geography_models::{GeoFeature, pad_code};
use aqi_map_models::Level;
use geojson::GeoJson;
use geojson::feature::Id;
use thiserror::Error;

/// Errors that can occur while loading geographic sources.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Reading a source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid GeoJSON.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Fetching a source document failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The document parsed but is not usable as a feature list.
    #[error("Malformed source: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

fn feature_code(id: &Id) -> String {
    match id {
        Id::String(code) => code.clone(),
        Id::Number(number) => number
            .as_u64()
            .map_or_else(|| number.to_string(), |n| n.to_string()),
    }
}

/// Parses a GeoJSON feature collection into [`GeoFeature`]s.
///
/// Features missing an id or a `name` property cannot join anything and
/// are skipped with a warning rather than failing the load.
///
/// # Errors
///
/// Returns [`GeoError`] if the document is not a GeoJSON feature
/// collection.
pub fn features_from_geojson(document: &str) -> Result<Vec<GeoFeature>, GeoError> {
    let GeoJson::FeatureCollection(collection) = document.parse::<GeoJson>()? else {
        return Err(GeoError::Malformed {
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(code) = feature.id.as_ref().map(feature_code) else {
            log::warn!("Skipping feature without an id");
            continue;
        };
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str());
        let Some(name) = name else {
            log::warn!("Skipping feature {code}: no name property");
            continue;
        };

        features.push(GeoFeature {
            code,
            name: name.to_string(),
            state_name: None,
            geometry: feature.geometry,
        });
    }

    Ok(features)
}

/// Loads a GeoJSON feature collection from a file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed.
pub fn load_features(path: &Path) -> Result<Vec<GeoFeature>, GeoError> {
    let document = std::fs::read_to_string(path)?;
    let features = features_from_geojson(&document)?;
    log::info!("Loaded {} features from {}", features.len(), path.display());
    Ok(features)
}

/// The reconciled two-level geographic key space.
///
/// Owns both annotated feature lists for the session; the render loop only
/// reads them.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    states: Vec<GeoFeature>,
    counties: Vec<GeoFeature>,
}

impl RegionIndex {
    /// Reconciles the state and county hierarchies.
    ///
    /// Codes are normalized to their fixed widths (2 for states, 5 for
    /// counties); each county's leading two digits are resolved to the
    /// parent state name. An unresolvable county keeps `state_name: None`
    /// and will render as "no data" rather than failing the build.
    #[must_use]
    pub fn build(mut states: Vec<GeoFeature>, mut counties: Vec<GeoFeature>) -> Self {
        for state in &mut states {
            state.code = pad_code(&state.code, 2);
        }

        let code_to_state: BTreeMap<&str, &str> = states
            .iter()
            .map(|s| (s.code.as_str(), s.name.as_str()))
            .collect();

        let mut unresolved = 0_usize;
        for county in &mut counties {
            county.code = pad_code(&county.code, 5);
            // get(..2) rather than a byte slice: an id that is not a
            // plain numeric code must degrade to "no data", not panic.
            county.state_name = county
                .code
                .get(..2)
                .and_then(|state_code| code_to_state.get(state_code))
                .map(ToString::to_string);
            if county.state_name.is_none() {
                unresolved += 1;
                log::debug!(
                    "County {} ({}) has no matching state",
                    county.name,
                    county.code
                );
            }
        }

        if unresolved > 0 {
            log::warn!("{unresolved} county features could not be joined to a state");
        }
        log::info!(
            "Region index built: {} states, {} counties",
            states.len(),
            counties.len()
        );

        Self { states, counties }
    }

    /// The annotated feature list for one aggregation level.
    #[must_use]
    pub fn features(&self, level: Level) -> &[GeoFeature] {
        match level {
            Level::State => &self.states,
            Level::County => &self.counties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(code: &str, name: &str) -> GeoFeature {
        GeoFeature {
            code: code.to_string(),
            name: name.to_string(),
            state_name: None,
            geometry: None,
        }
    }

    #[test]
    fn resolves_county_parent_state() {
        let index = RegionIndex::build(
            vec![feature("06", "California"), feature("04", "Arizona")],
            vec![feature("06037", "Los Angeles"), feature("4013", "Maricopa")],
        );

        let counties = index.features(Level::County);
        assert_eq!(counties[0].code, "06037");
        assert_eq!(counties[0].state_name.as_deref(), Some("California"));
        assert_eq!(counties[1].code, "04013");
        assert_eq!(counties[1].state_name.as_deref(), Some("Arizona"));
    }

    #[test]
    fn pads_state_codes() {
        let index = RegionIndex::build(vec![feature("6", "California")], vec![]);
        assert_eq!(index.features(Level::State)[0].code, "06");
    }

    #[test]
    fn non_numeric_county_id_degrades_to_unresolved() {
        // A multi-byte string id must not panic on the state-code split.
        let index = RegionIndex::build(
            vec![feature("06", "California")],
            vec![feature("県域コード", "Oddball"), feature("06037", "Los Angeles")],
        );

        let counties = index.features(Level::County);
        assert_eq!(counties[0].state_name, None);
        assert_eq!(counties[1].state_name.as_deref(), Some("California"));
    }

    #[test]
    fn unmatched_county_keeps_none() {
        let index = RegionIndex::build(
            vec![feature("06", "California")],
            vec![feature("99999", "Nowhere")],
        );
        assert_eq!(index.features(Level::County)[0].state_name, None);
    }

    #[test]
    fn parses_feature_collection() {
        let document = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "06",
                    "properties": { "name": "California" },
                    "geometry": null
                },
                {
                    "type": "Feature",
                    "id": 4,
                    "properties": { "name": "Arizona" },
                    "geometry": null
                }
            ]
        }"#;
        let features = features_from_geojson(document).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].code, "06");
        assert_eq!(features[0].name, "California");
        assert_eq!(features[1].code, "4");
    }

    #[test]
    fn skips_feature_without_name() {
        let document = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "id": "06", "properties": {}, "geometry": null }
            ]
        }"#;
        let features = features_from_geojson(document).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn rejects_non_collection() {
        let document = r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#;
        assert!(matches!(
            features_from_geojson(document),
            Err(GeoError::Malformed { .. })
        ));
    }
}
