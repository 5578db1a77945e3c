#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the AQI choropleth pipeline.
//!
//! Defines the pollutant taxonomy, the parsed measurement [`Record`], the
//! month-keyed [`Timeline`], and the session-wide [`Selection`] that every
//! event handler reads and the session loop mutates. These types are
//! independent of any data source or drawing surface.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The four pollutants tracked by the dataset, in AQI units.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Pollutant {
    /// Ground-level ozone.
    O3,
    /// Carbon monoxide.
    Co,
    /// Sulfur dioxide.
    So2,
    /// Nitrogen dioxide.
    No2,
}

impl Pollutant {
    /// All pollutants, in dataset column order.
    pub const ALL: &[Self] = &[Self::O3, Self::Co, Self::So2, Self::No2];

    /// The CSV column header carrying this pollutant's AQI value.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::O3 => "O3 AQI",
            Self::Co => "CO AQI",
            Self::So2 => "SO2 AQI",
            Self::No2 => "NO2 AQI",
        }
    }
}

/// A `YYYY-MM` month key.
///
/// Lexicographic ordering of the zero-padded form equals chronological
/// ordering, so the derived `Ord` is the timeline ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Builds the zero-padded key for a year/month pair.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self(format!("{year}-{month:02}"))
    }

    /// The underlying `YYYY-MM` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed measurement row: a single day's readings for one county.
///
/// Immutable once parsed. A pollutant field that failed numeric coercion
/// holds `f64::NAN` and is excluded from aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// State name, trimmed.
    pub state: String,
    /// County name, trimmed.
    pub county: String,
    /// Calendar year of the reading.
    pub year: i32,
    /// Calendar month of the reading (1-12).
    pub month: u32,
    /// Derived `YYYY-MM` key used for timeline grouping.
    pub month_key: MonthKey,
    /// Ozone AQI.
    pub o3_aqi: f64,
    /// Carbon monoxide AQI.
    pub co_aqi: f64,
    /// Sulfur dioxide AQI.
    pub so2_aqi: f64,
    /// Nitrogen dioxide AQI.
    pub no2_aqi: f64,
}

impl Record {
    /// Returns the AQI reading for one pollutant (possibly NaN).
    #[must_use]
    pub const fn value(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::O3 => self.o3_aqi,
            Pollutant::Co => self.co_aqi,
            Pollutant::So2 => self.so2_aqi,
            Pollutant::No2 => self.no2_aqi,
        }
    }
}

/// Sorted, deduplicated list of every month key observed in the dataset.
///
/// Indexed `0..len-1`; index 0 is the earliest month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline(Vec<MonthKey>);

impl Timeline {
    /// Collects the distinct month keys from parsed records, ascending.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let months: std::collections::BTreeSet<MonthKey> =
            records.iter().map(|r| r.month_key.clone()).collect();
        Self(months.into_iter().collect())
    }

    /// The month key at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MonthKey> {
        self.0.get(index)
    }

    /// Number of distinct months.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dataset contained no months at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the final month (0 for an empty or single-month timeline).
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Index of a month key within the timeline.
    #[must_use]
    pub fn position(&self, key: &MonthKey) -> Option<usize> {
        self.0.binary_search(key).ok()
    }
}

/// Aggregation granularity of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    /// One region per state.
    State,
    /// One region per county.
    County,
}

/// The single live input combination for the session.
///
/// Exactly one instance exists; it is created at startup and mutated only
/// inside the session's event handler. Invariant: `month_index` stays within
/// `[0, timeline.last_index()]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Current aggregation granularity.
    pub level: Level,
    /// Index into the timeline.
    pub month_index: usize,
    /// Currently displayed pollutant.
    pub pollutant: Pollutant,
    /// Whether auto-play is running.
    pub playing: bool,
}

impl Selection {
    /// The startup selection: state level, earliest month, not playing.
    #[must_use]
    pub const fn new(pollutant: Pollutant) -> Self {
        Self {
            level: Level::State,
            month_index: 0,
            pollutant,
            playing: false,
        }
    }
}

/// Everything the session loop reacts to: the data-ready render is implicit
/// at startup; thereafter only UI input and playback timer ticks arrive.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Month slider moved to an index.
    MonthChanged(usize),
    /// Granularity switched.
    LevelChanged(Level),
    /// Pollutant dropdown changed.
    PollutantChanged(Pollutant),
    /// Play/pause button pressed.
    PlayToggled,
    /// Playback timer fired. Ticks from a cancelled timer carry a stale
    /// generation and are ignored.
    PlaybackTick {
        /// Generation the timer was started with.
        generation: u64,
    },
    /// Pointer entered the feature drawn with this identity key.
    PointerEntered(String),
    /// Pointer moved while over a feature.
    PointerMoved {
        /// Screen x.
        x: f64,
        /// Screen y.
        y: f64,
    },
    /// Pointer left the hovered feature.
    PointerLeft,
}
