#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic feature types and region-key construction.
//!
//! The region-key functions here are the single source of truth for how a
//! measurement row and a map feature resolve to the same aggregate-table
//! key. Both the aggregation engine and the render loop use them; nothing
//! else may build these strings by hand.

use aqi_map_models::Level;
use serde::{Deserialize, Serialize};

/// Region key for state-level aggregation: the canonical state name.
#[must_use]
pub fn state_key(state: &str) -> String {
    state.to_string()
}

/// Region key for county-level aggregation: `"{state}|{county}"`.
///
/// The separator makes the composite unambiguous as long as state names
/// themselves never contain `|`, which holds for US state names.
#[must_use]
pub fn county_key(state: &str, county: &str) -> String {
    format!("{state}|{county}")
}

/// Left-pads a numeric FIPS code with zeros to a fixed width.
///
/// Codes wider than `width` are returned unchanged.
#[must_use]
pub fn pad_code(code: &str, width: usize) -> String {
    format!("{code:0>width$}")
}

/// One polygon from a geographic source document.
///
/// State features carry a two-digit FIPS `code`; county features a
/// five-digit one whose leading two digits identify the parent state.
/// `state_name` is attached to county features during indexing and stays
/// `None` when the parent state cannot be resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeature {
    /// Zero-padded numeric FIPS code; unique within its hierarchy.
    pub code: String,
    /// Region name from the source document's properties.
    pub name: String,
    /// Parent state name, resolved for county features by the region index.
    pub state_name: Option<String>,
    /// Polygon geometry, passed through untouched to the drawing surface.
    pub geometry: Option<geojson::Geometry>,
}

impl GeoFeature {
    /// The aggregate-table join key for this feature at the given level.
    ///
    /// Returns `None` for a county whose parent state was never resolved;
    /// such a feature is still drawn, but always as "no data".
    #[must_use]
    pub fn region_key(&self, level: Level) -> Option<String> {
        match level {
            Level::State => Some(state_key(&self.name)),
            Level::County => self
                .state_name
                .as_deref()
                .map(|state| county_key(state, &self.name)),
        }
    }

    /// Human-readable label for tooltips.
    #[must_use]
    pub fn label(&self, level: Level) -> String {
        match level {
            Level::State => self.name.clone(),
            Level::County => self.state_name.as_deref().map_or_else(
                || self.name.clone(),
                |state| format!("{}, {state}", self.name),
            ),
        }
    }
}
