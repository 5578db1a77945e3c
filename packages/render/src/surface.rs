//! Abstract UI-output collaborators.
//!
//! The render loop never touches a real drawing surface; it drives these
//! traits. A GUI front end implements them against its canvas, tooltip
//! element, and transport controls; the headless binary implements them
//! with log output; tests implement them with recording doubles.

use aqi_map_geography_models::GeoFeature;
use aqi_map_models::{MonthKey, Pollutant};

use crate::color::Rgb;

/// The drawing surface, reconciled with enter/update/exit discipline.
///
/// `enter` is the expensive call (the surface computes path geometry from
/// the feature); the render loop issues it at most once per feature per
/// level switch. Month and pollutant changes arrive as `fill` calls only.
pub trait Surface {
    /// A feature newly present in the drawn set; create its geometry.
    fn enter(&mut self, key: &str, feature: &GeoFeature);

    /// A feature no longer present; remove it.
    fn exit(&mut self, key: &str);

    /// Refresh the fill color of a surviving feature.
    fn fill(&mut self, key: &str, color: Rgb);
}

/// What the tooltip collaborator displays for a hovered feature.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    /// Human-readable region label.
    pub label: String,
    /// The pollutant currently displayed.
    pub pollutant: Pollutant,
    /// The resolved value; `None` renders as "no data".
    pub value: Option<f64>,
    /// The month the value belongs to.
    pub month_key: MonthKey,
}

/// The external tooltip collaborator.
pub trait Tooltip {
    /// Show the tooltip with fresh content.
    fn show(&mut self, content: &TooltipContent);

    /// Reposition the tooltip at screen coordinates.
    fn move_to(&mut self, x: f64, y: f64);

    /// Hide the tooltip.
    fn hide(&mut self);
}

/// The month display and play/pause label collaborator.
pub trait Readout {
    /// Display the current month key.
    fn set_month(&mut self, key: &MonthKey);

    /// Reflect the playback state on the play/pause control.
    fn set_playing(&mut self, playing: bool);
}
