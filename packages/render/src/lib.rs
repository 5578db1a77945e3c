#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The incremental map render loop.
//!
//! Resolving the current selection to per-feature values is a pure step;
//! applying them to the drawing surface is an effectful one driven through
//! the [`Surface`] trait. The loop reconciles the surface against the
//! selected feature list by stable identity key, so geometry is created
//! once per level switch and month changes only refresh fill colors.

pub mod color;
pub mod surface;

use std::collections::{BTreeMap, BTreeSet};

use aqi_map_aggregate::{AggregateTable, AggregateTables};
use aqi_map_geography::RegionIndex;
use aqi_map_models::{MonthKey, Pollutant, Selection, Timeline};

pub use crate::color::{ColorScale, NO_DATA, Rgb};
pub use crate::surface::{Readout, Surface, Tooltip, TooltipContent};

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The surface was reconciled and filled.
    Drawn {
        /// Features newly created on the surface.
        entered: usize,
        /// Features removed from the surface.
        exited: usize,
        /// Features that received an aggregate value (the rest were
        /// filled with the no-data color).
        valued: usize,
    },
    /// No region had a value for this selection; the draw was skipped and
    /// the prior frame left untouched.
    Skipped,
}

/// Resolves one (month, pollutant) column of an aggregate table.
///
/// Pure: regions with an absent or NaN cell are omitted, never zeroed.
#[must_use]
pub fn resolve_values(
    table: &AggregateTable,
    month_key: &MonthKey,
    pollutant: Pollutant,
) -> BTreeMap<String, f64> {
    table
        .region_keys()
        .filter_map(|region| {
            table
                .value(region, month_key, pollutant)
                .filter(|v| !v.is_nan())
                .map(|v| (region.to_string(), v))
        })
        .collect()
}

/// Cached hover data for one drawn feature.
#[derive(Debug, Clone)]
struct HoverEntry {
    label: String,
    value: Option<f64>,
}

/// The render loop's retained state: which identity keys are currently on
/// the surface, and the per-render value/label cache that pointer events
/// resolve against.
#[derive(Debug, Default)]
pub struct MapRenderer {
    scale: ColorScale,
    drawn: BTreeSet<String>,
    hover: BTreeMap<String, HoverEntry>,
    month_key: Option<MonthKey>,
    pollutant: Option<Pollutant>,
}

impl MapRenderer {
    /// A renderer using the given scale for every fill.
    #[must_use]
    pub fn new(scale: ColorScale) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// The scale shared by map fills and the legend.
    #[must_use]
    pub const fn scale(&self) -> &ColorScale {
        &self.scale
    }

    /// Renders the current selection onto the surface.
    ///
    /// Features are reconciled by their stable identity key (the padded
    /// FIPS code, unique within a level); a level switch therefore
    /// replaces the whole drawn set, while a month or pollutant change
    /// touches fills only. When no region resolves to a value the draw is
    /// skipped with a diagnostic and the prior frame remains visible.
    pub fn render(
        &mut self,
        selection: &Selection,
        timeline: &Timeline,
        tables: &AggregateTables,
        index: &RegionIndex,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let Some(month_key) = timeline.get(selection.month_index) else {
            log::warn!("Month index {} outside the timeline", selection.month_index);
            return RenderOutcome::Skipped;
        };

        let features = index.features(selection.level);
        let table = tables.for_level(selection.level);
        let values = resolve_values(table, month_key, selection.pollutant);

        if values.is_empty() {
            log::warn!(
                "No data for {} in {month_key}; keeping previous frame",
                selection.level
            );
            return RenderOutcome::Skipped;
        }

        let desired: BTreeSet<&str> = features.iter().map(|f| f.code.as_str()).collect();

        let stale: Vec<String> = self
            .drawn
            .iter()
            .filter(|key| !desired.contains(key.as_str()))
            .cloned()
            .collect();
        for key in &stale {
            surface.exit(key);
            self.drawn.remove(key);
        }

        let mut entered = 0_usize;
        let mut valued = 0_usize;
        self.hover.clear();

        for feature in features {
            if !self.drawn.contains(&feature.code) {
                surface.enter(&feature.code, feature);
                self.drawn.insert(feature.code.clone());
                entered += 1;
            }

            let value = feature
                .region_key(selection.level)
                .and_then(|region| values.get(&region).copied());
            let fill = value.map_or(color::NO_DATA, |v| {
                valued += 1;
                self.scale.color(v)
            });
            surface.fill(&feature.code, fill);

            self.hover.insert(
                feature.code.clone(),
                HoverEntry {
                    label: feature.label(selection.level),
                    value,
                },
            );
        }

        self.month_key = Some(month_key.clone());
        self.pollutant = Some(selection.pollutant);

        log::debug!(
            "Rendered {} {month_key}: {entered} entered, {} exited, {valued}/{} valued",
            selection.level,
            stale.len(),
            features.len()
        );

        RenderOutcome::Drawn {
            entered,
            exited: stale.len(),
            valued,
        }
    }

    /// Resolves tooltip content for a hovered feature, using the same
    /// key/value pair the last render used for its fill.
    #[must_use]
    pub fn hover(&self, key: &str) -> Option<TooltipContent> {
        let entry = self.hover.get(key)?;
        Some(TooltipContent {
            label: entry.label.clone(),
            pollutant: self.pollutant?,
            value: entry.value,
            month_key: self.month_key.clone()?,
        })
    }
}
