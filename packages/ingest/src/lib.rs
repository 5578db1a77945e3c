#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV measurement ingestion.
//!
//! Parses the flat per-day, per-county pollutant table into typed
//! [`Record`]s with a derived `YYYY-MM` month key. Parsing is pure and
//! order-independent. An unparseable date makes the whole load fail,
//! since the timeline depends on placing every row; an unparseable AQI
//! value degrades to NaN and is excluded from later averaging.

use std::io::Read;
use std::path::Path;

use aqi_map_models::{MonthKey, Record};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading measurement data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure was malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row carried a date that does not parse as `YYYY-MM-DD`.
    #[error("unparseable date {value:?} on row {row}")]
    Date {
        /// 1-based data row number.
        row: usize,
        /// The offending field value.
        value: String,
    },
}

/// One raw CSV row, bound to the dataset's column headers.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "County")]
    county: String,
    #[serde(rename = "O3 AQI")]
    o3_aqi: String,
    #[serde(rename = "CO AQI")]
    co_aqi: String,
    #[serde(rename = "SO2 AQI")]
    so2_aqi: String,
    #[serde(rename = "NO2 AQI")]
    no2_aqi: String,
}

/// Coerces an AQI field to `f64`, yielding NaN for anything unparseable.
fn coerce_aqi(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_row(raw: &RawRow, row: usize) -> Result<Record, IngestError> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|_| {
        IngestError::Date {
            row,
            value: raw.date.clone(),
        }
    })?;

    let year = date.year();
    let month = date.month();

    Ok(Record {
        state: raw.state.trim().to_string(),
        county: raw.county.trim().to_string(),
        year,
        month,
        month_key: MonthKey::new(year, month),
        o3_aqi: coerce_aqi(&raw.o3_aqi),
        co_aqi: coerce_aqi(&raw.co_aqi),
        so2_aqi: coerce_aqi(&raw.so2_aqi),
        no2_aqi: coerce_aqi(&raw.no2_aqi),
    })
}

/// Parses every row from a CSV reader.
///
/// # Errors
///
/// Returns [`IngestError`] on I/O failure, malformed CSV, or any row
/// whose date does not parse.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (i, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let raw = result?;
        records.push(parse_row(&raw, i + 1)?);
    }

    Ok(records)
}

/// Loads the full measurement table from a CSV file.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or any row fails
/// to parse. Nothing downstream can proceed on failure.
pub fn load_records(path: &Path) -> Result<Vec<Record>, IngestError> {
    let file = std::fs::File::open(path)?;
    let records = read_records(std::io::BufReader::new(file))?;
    log::info!("Loaded {} measurement rows from {}", records.len(), path.display());
    Ok(records)
}
