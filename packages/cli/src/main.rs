#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless driver for the AQI choropleth session.
//!
//! Loads the measurement CSV and the two geographic documents (from disk
//! or a one-shot HTTP fetch), builds the aggregate tables and region
//! index, renders the initial frame against log-backed collaborators, and
//! optionally auto-plays the whole timeline. Any load failure aborts
//! before anything is rendered.

mod log_ui;
mod session;

use std::path::PathBuf;
use std::time::Duration;

use aqi_map_aggregate::AggregateTables;
use aqi_map_geography::RegionIndex;
use aqi_map_geography_models::GeoFeature;
use aqi_map_models::{Event, Pollutant, Selection, Timeline};
use aqi_map_playback::PlaybackController;
use clap::Parser;
use tokio::sync::mpsc;

use crate::log_ui::{LogReadout, LogSurface, LogTooltip};
use crate::session::Session;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "aqi_map_cli", about = "AQI choropleth session driver")]
struct Args {
    /// Measurement CSV (Date, State, County, per-pollutant AQI columns).
    #[arg(long)]
    data: PathBuf,

    /// State polygons as a GeoJSON feature collection.
    #[arg(long, conflicts_with = "states_url")]
    states: Option<PathBuf>,

    /// County polygons as a GeoJSON feature collection.
    #[arg(long, conflicts_with = "counties_url")]
    counties: Option<PathBuf>,

    /// Fetch the state polygons from a URL instead of a file.
    #[arg(long)]
    states_url: Option<String>,

    /// Fetch the county polygons from a URL instead of a file.
    #[arg(long)]
    counties_url: Option<String>,

    /// Pollutant shown first (O3, CO, SO2, NO2).
    #[arg(long, default_value = "O3")]
    pollutant: String,

    /// Auto-play the timeline to the end, then exit.
    #[arg(long)]
    play: bool,

    /// Playback tick period in milliseconds.
    #[arg(long, default_value_t = 500)]
    period_ms: u64,
}

async fn load_geography(
    file: Option<&PathBuf>,
    url: Option<&str>,
    what: &str,
) -> Result<Vec<GeoFeature>, Box<dyn std::error::Error>> {
    match (file, url) {
        (Some(path), _) => Ok(aqi_map_geography::load_features(path)?),
        (None, Some(url)) => Ok(aqi_map_geography::fetch::fetch_features(url).await?),
        (None, None) => Err(format!("no {what} source: pass --{what} or --{what}-url").into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    let pollutant: Pollutant = args
        .pollutant
        .parse()
        .map_err(|_| format!("unknown pollutant: {}", args.pollutant))?;

    let records = aqi_map_ingest::load_records(&args.data)?;
    let timeline = Timeline::from_records(&records);
    if timeline.is_empty() {
        return Err("dataset contains no months".into());
    }

    let states = load_geography(args.states.as_ref(), args.states_url.as_deref(), "states").await?;
    let counties =
        load_geography(args.counties.as_ref(), args.counties_url.as_deref(), "counties").await?;

    let tables = AggregateTables::build(&records);
    let index = RegionIndex::build(states, counties);

    let (tx, mut rx) = mpsc::channel::<Event>(16);
    let playback = PlaybackController::new(Duration::from_millis(args.period_ms));

    let mut session = Session::new(
        Selection::new(pollutant),
        timeline,
        tables,
        index,
        playback,
        LogSurface::default(),
        LogTooltip::default(),
        LogReadout::default(),
        tx.clone(),
    );
    session.start();

    if args.play {
        session.handle(Event::PlayToggled);
        while session.selection().playing {
            let Some(event) = rx.recv().await else {
                break;
            };
            session.handle(event);
        }
        log::info!("Playback finished at the end of the timeline");
    }

    Ok(())
}
