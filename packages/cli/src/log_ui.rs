//! Log-backed collaborator implementations for headless runs.
//!
//! Stand-ins for the real drawing surface, tooltip, and transport
//! controls: every call becomes a log line, so a full playback run can be
//! observed (and sanity-checked) from the terminal.

use aqi_map_geography_models::GeoFeature;
use aqi_map_models::MonthKey;
use aqi_map_render::{Readout, Rgb, Surface, Tooltip, TooltipContent};

/// Drawing surface that logs reconciliation traffic.
#[derive(Default)]
pub struct LogSurface {
    drawn: usize,
}

impl Surface for LogSurface {
    fn enter(&mut self, key: &str, feature: &GeoFeature) {
        self.drawn += 1;
        log::debug!("enter {key} ({}) [{} drawn]", feature.name, self.drawn);
    }

    fn exit(&mut self, key: &str) {
        self.drawn = self.drawn.saturating_sub(1);
        log::debug!("exit {key} [{} drawn]", self.drawn);
    }

    fn fill(&mut self, key: &str, color: Rgb) {
        log::trace!("fill {key} {color}");
    }
}

/// Tooltip that logs what a GUI would display.
#[derive(Default)]
pub struct LogTooltip;

impl Tooltip for LogTooltip {
    fn show(&mut self, content: &TooltipContent) {
        let value = content
            .value
            .map_or_else(|| "no data".to_string(), |v| format!("{v:.1}"));
        log::info!(
            "tooltip: {} | {}: {value} | {}",
            content.label,
            content.pollutant,
            content.month_key
        );
    }

    fn move_to(&mut self, x: f64, y: f64) {
        log::trace!("tooltip at ({x}, {y})");
    }

    fn hide(&mut self) {
        log::trace!("tooltip hidden");
    }
}

/// Month display and play/pause label as log lines.
#[derive(Default)]
pub struct LogReadout;

impl Readout for LogReadout {
    fn set_month(&mut self, key: &MonthKey) {
        log::info!("month: {key}");
    }

    fn set_playing(&mut self, playing: bool) {
        log::info!("playback: {}", if playing { "playing" } else { "paused" });
    }
}
