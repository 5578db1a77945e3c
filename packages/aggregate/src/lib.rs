#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Two-level mean aggregation of measurement records.
//!
//! Groups records by region key, then by month key, and computes the
//! arithmetic mean per pollutant over the non-NaN samples of each group.
//! A group with zero valid samples for a pollutant has no entry for it:
//! absent means "no data", never zero. The engine is key-function-agnostic
//! and runs twice at startup, once per aggregation level; the results are
//! cached for the whole session and never mutated.

use std::collections::BTreeMap;

use aqi_map_geography_models::{county_key, state_key};
use aqi_map_models::{Level, MonthKey, Pollutant, Record};

/// Mean AQI per pollutant for one (region, month) group.
pub type PollutantMeans = BTreeMap<Pollutant, f64>;

/// Running sum/count pair for one pollutant within a group.
#[derive(Default)]
struct MeanAccumulator {
    sum: f64,
    count: u32,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        if !value.is_nan() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Immutable region → month → pollutant mean table for one level.
///
/// `BTreeMap`-backed, so iteration order and contents are independent of
/// input record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable(BTreeMap<String, BTreeMap<MonthKey, PollutantMeans>>);

impl AggregateTable {
    /// The mean for one (region, month, pollutant) cell, if any sample
    /// contributed to it.
    #[must_use]
    pub fn value(&self, region_key: &str, month_key: &MonthKey, pollutant: Pollutant) -> Option<f64> {
        self.0
            .get(region_key)?
            .get(month_key)?
            .get(&pollutant)
            .copied()
    }

    /// Iterates the region keys present in the table.
    pub fn region_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of distinct regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no region produced any group at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Groups records by `key_fn` and month, producing per-pollutant means.
pub fn aggregate<F>(records: &[Record], key_fn: F) -> AggregateTable
where
    F: Fn(&Record) -> String,
{
    let mut groups: BTreeMap<String, BTreeMap<MonthKey, BTreeMap<Pollutant, MeanAccumulator>>> =
        BTreeMap::new();

    for record in records {
        let cell = groups
            .entry(key_fn(record))
            .or_default()
            .entry(record.month_key.clone())
            .or_default();
        for &pollutant in Pollutant::ALL {
            cell.entry(pollutant).or_default().push(record.value(pollutant));
        }
    }

    let table = groups
        .into_iter()
        .map(|(region, months)| {
            let months = months
                .into_iter()
                .map(|(month, accumulators)| {
                    let means = accumulators
                        .into_iter()
                        .filter_map(|(pollutant, acc)| acc.mean().map(|m| (pollutant, m)))
                        .collect();
                    (month, means)
                })
                .collect();
            (region, months)
        })
        .collect();

    AggregateTable(table)
}

/// The session's two cached aggregate tables, one per level.
#[derive(Debug, Clone)]
pub struct AggregateTables {
    /// Keyed by state name.
    pub state: AggregateTable,
    /// Keyed by `"{state}|{county}"`.
    pub county: AggregateTable,
}

impl AggregateTables {
    /// Runs the engine once per level over the full record set.
    #[must_use]
    pub fn build(records: &[Record]) -> Self {
        let state = aggregate(records, |r| state_key(&r.state));
        let county = aggregate(records, |r| county_key(&r.state, &r.county));
        log::info!(
            "Aggregated {} records into {} state and {} county regions",
            records.len(),
            state.len(),
            county.len()
        );
        Self { state, county }
    }

    /// The table matching one aggregation level.
    #[must_use]
    pub const fn for_level(&self, level: Level) -> &AggregateTable {
        match level {
            Level::State => &self.state,
            Level::County => &self.county,
        }
    }
}
