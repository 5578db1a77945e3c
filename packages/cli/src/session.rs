//! The single-threaded session loop.
//!
//! Owns the one live [`Selection`] and every piece of static state built at
//! startup. All mutation happens inside [`Session::handle`]; events arrive
//! from user input or the playback timer through one channel and run to
//! completion before the next is processed.

use aqi_map_aggregate::AggregateTables;
use aqi_map_geography::RegionIndex;
use aqi_map_models::{Event, Selection, Timeline};
use aqi_map_playback::{PlaybackController, TickAction};
use aqi_map_render::{MapRenderer, Readout, Surface, Tooltip};
use tokio::sync::mpsc;

/// One interactive session over a fully loaded dataset.
pub struct Session<S, T, R> {
    selection: Selection,
    timeline: Timeline,
    tables: AggregateTables,
    index: RegionIndex,
    renderer: MapRenderer,
    playback: PlaybackController,
    surface: S,
    tooltip: T,
    readout: R,
    events: mpsc::Sender<Event>,
}

impl<S: Surface, T: Tooltip, R: Readout> Session<S, T, R> {
    /// Wires up a session around the startup-built static state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        selection: Selection,
        timeline: Timeline,
        tables: AggregateTables,
        index: RegionIndex,
        playback: PlaybackController,
        surface: S,
        tooltip: T,
        readout: R,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            selection,
            timeline,
            tables,
            index,
            renderer: MapRenderer::default(),
            playback,
            surface,
            tooltip,
            readout,
            events,
        }
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Draws the initial frame and primes the readout.
    pub fn start(&mut self) {
        self.refresh_month_readout();
        self.readout.set_playing(self.selection.playing);
        self.render();
    }

    /// Handles one event to completion. The only place the selection
    /// mutates.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::MonthChanged(index) => {
                self.selection.month_index = index.min(self.timeline.last_index());
                self.refresh_month_readout();
                self.render();
            }
            Event::LevelChanged(level) => {
                self.selection.level = level;
                self.render();
            }
            Event::PollutantChanged(pollutant) => {
                self.selection.pollutant = pollutant;
                self.render();
            }
            Event::PlayToggled => {
                let playing = self.playback.toggle(
                    self.selection.month_index,
                    self.timeline.last_index(),
                    &self.events,
                );
                self.selection.playing = playing;
                self.readout.set_playing(playing);
            }
            Event::PlaybackTick { generation } => self.on_tick(generation),
            Event::PointerEntered(key) => {
                if let Some(content) = self.renderer.hover(&key) {
                    self.tooltip.show(&content);
                }
            }
            Event::PointerMoved { x, y } => self.tooltip.move_to(x, y),
            Event::PointerLeft => self.tooltip.hide(),
        }
    }

    fn on_tick(&mut self, generation: u64) {
        match self.playback.tick(
            generation,
            self.selection.month_index,
            self.timeline.last_index(),
        ) {
            TickAction::Ignore => {}
            TickAction::Finish => {
                self.selection.playing = false;
                self.readout.set_playing(false);
            }
            TickAction::Advance => {
                self.selection.month_index += 1;
                self.refresh_month_readout();
                self.render();
            }
        }
    }

    fn refresh_month_readout(&mut self) {
        if let Some(key) = self.timeline.get(self.selection.month_index) {
            self.readout.set_month(key);
        }
    }

    fn render(&mut self) {
        self.renderer.render(
            &self.selection,
            &self.timeline,
            &self.tables,
            &self.index,
            &mut self.surface,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use aqi_map_geography_models::GeoFeature;
    use aqi_map_models::{Level, MonthKey, Pollutant, Record};
    use aqi_map_render::{ColorScale, Rgb, TooltipContent};

    #[derive(Default)]
    struct RecordingSurface {
        entered: Vec<String>,
        exited: Vec<String>,
        fills: BTreeMap<String, Rgb>,
    }

    impl Surface for RecordingSurface {
        fn enter(&mut self, key: &str, _feature: &GeoFeature) {
            self.entered.push(key.to_string());
        }

        fn exit(&mut self, key: &str) {
            self.exited.push(key.to_string());
        }

        fn fill(&mut self, key: &str, color: Rgb) {
            self.fills.insert(key.to_string(), color);
        }
    }

    #[derive(Default)]
    struct RecordingTooltip {
        shown: Option<TooltipContent>,
        position: Option<(f64, f64)>,
        hidden: bool,
    }

    impl Tooltip for RecordingTooltip {
        fn show(&mut self, content: &TooltipContent) {
            self.shown = Some(content.clone());
            self.hidden = false;
        }

        fn move_to(&mut self, x: f64, y: f64) {
            self.position = Some((x, y));
        }

        fn hide(&mut self) {
            self.hidden = true;
        }
    }

    #[derive(Default)]
    struct RecordingReadout {
        month: Option<String>,
        playing: Option<bool>,
    }

    impl Readout for RecordingReadout {
        fn set_month(&mut self, key: &MonthKey) {
            self.month = Some(key.as_str().to_string());
        }

        fn set_playing(&mut self, playing: bool) {
            self.playing = Some(playing);
        }
    }

    fn record(state: &str, county: &str, month: u32, values: [f64; 4]) -> Record {
        Record {
            state: state.to_string(),
            county: county.to_string(),
            year: 2019,
            month,
            month_key: MonthKey::new(2019, month),
            o3_aqi: values[0],
            co_aqi: values[1],
            so2_aqi: values[2],
            no2_aqi: values[3],
        }
    }

    fn feature(code: &str, name: &str) -> GeoFeature {
        GeoFeature {
            code: code.to_string(),
            name: name.to_string(),
            state_name: None,
            geometry: None,
        }
    }

    type TestSession = Session<RecordingSurface, RecordingTooltip, RecordingReadout>;

    fn session(records: Vec<Record>) -> (TestSession, mpsc::Sender<Event>) {
        let timeline = Timeline::from_records(&records);
        let tables = AggregateTables::build(&records);
        let index = RegionIndex::build(
            vec![feature("06", "California"), feature("04", "Arizona")],
            vec![feature("06037", "Los Angeles"), feature("04013", "Maricopa")],
        );
        let (tx, _rx) = mpsc::channel(16);
        let session = Session::new(
            Selection::new(Pollutant::O3),
            timeline,
            tables,
            index,
            PlaybackController::default(),
            RecordingSurface::default(),
            RecordingTooltip::default(),
            RecordingReadout::default(),
            tx.clone(),
        );
        (session, tx)
    }

    fn la_dataset() -> Vec<Record> {
        vec![
            record("California", "Los Angeles", 1, [10.0, 1.0, 2.0, 3.0]),
            record("California", "Los Angeles", 1, [20.0, f64::NAN, 4.0, 5.0]),
            record("California", "Los Angeles", 2, [30.0, 2.0, 6.0, 7.0]),
        ]
    }

    #[tokio::test]
    async fn end_to_end_county_aggregate() {
        let (mut session, _tx) = session(la_dataset());
        session.start();
        session.handle(Event::LevelChanged(Level::County));

        // Mean of the two January samples, NaN CO excluded.
        let scale = ColorScale::default();
        assert_eq!(session.surface.fills["06037"], scale.color(15.0));

        session.handle(Event::PollutantChanged(Pollutant::Co));
        assert_eq!(session.surface.fills["06037"], scale.color(1.0));
        session.handle(Event::PollutantChanged(Pollutant::So2));
        assert_eq!(session.surface.fills["06037"], scale.color(3.0));
        session.handle(Event::PollutantChanged(Pollutant::No2));
        assert_eq!(session.surface.fills["06037"], scale.color(4.0));
    }

    #[tokio::test]
    async fn level_switch_swaps_feature_sets() {
        let (mut session, _tx) = session(la_dataset());
        session.start();
        assert_eq!(session.surface.entered, vec!["06", "04"]);

        session.surface.entered.clear();
        session.handle(Event::LevelChanged(Level::County));

        let mut exited = session.surface.exited.clone();
        exited.sort_unstable();
        assert_eq!(exited, vec!["04", "06"]);
        let mut entered = session.surface.entered.clone();
        entered.sort_unstable();
        assert_eq!(entered, vec!["04013", "06037"]);
    }

    #[tokio::test]
    async fn month_change_clamps_and_updates_readout() {
        let (mut session, _tx) = session(la_dataset());
        session.start();
        assert_eq!(session.readout.month.as_deref(), Some("2019-01"));

        session.handle(Event::MonthChanged(99));
        assert_eq!(session.selection().month_index, 1);
        assert_eq!(session.readout.month.as_deref(), Some("2019-02"));
    }

    #[tokio::test]
    async fn play_toggle_at_last_month_stays_stopped() {
        let (mut session, _tx) = session(la_dataset());
        session.start();
        session.handle(Event::MonthChanged(1));

        session.handle(Event::PlayToggled);
        assert!(!session.selection().playing);
        assert_eq!(session.readout.playing, Some(false));
    }

    #[tokio::test]
    async fn playback_advances_then_finishes() {
        let (mut session, tx) = session(la_dataset());
        session.start();
        session.handle(Event::PlayToggled);
        assert!(session.selection().playing);
        drop(tx);

        // Drive the ticks by hand; the generation is the first one issued.
        session.handle(Event::PlaybackTick { generation: 1 });
        assert_eq!(session.selection().month_index, 1);
        assert_eq!(session.readout.month.as_deref(), Some("2019-02"));

        session.handle(Event::PlaybackTick { generation: 1 });
        assert!(!session.selection().playing);
        assert_eq!(session.selection().month_index, 1);

        // The timer is dead; a straggler tick is stale.
        session.handle(Event::PlaybackTick { generation: 1 });
        assert_eq!(session.selection().month_index, 1);
    }

    #[tokio::test]
    async fn stale_tick_after_manual_pause_is_ignored() {
        let (mut session, _tx) = session(la_dataset());
        session.start();
        session.handle(Event::PlayToggled);
        session.handle(Event::PlayToggled);
        assert!(!session.selection().playing);

        session.handle(Event::PlaybackTick { generation: 1 });
        assert_eq!(session.selection().month_index, 0);
    }

    #[tokio::test]
    async fn pointer_events_drive_the_tooltip() {
        let (mut session, _tx) = session(la_dataset());
        session.start();

        session.handle(Event::PointerEntered("06".to_string()));
        let content = session.tooltip.shown.clone().unwrap();
        assert_eq!(content.label, "California");
        assert!((content.value.unwrap() - 15.0).abs() < f64::EPSILON);

        session.handle(Event::PointerMoved { x: 40.0, y: 60.0 });
        assert_eq!(session.tooltip.position, Some((40.0, 60.0)));

        session.handle(Event::PointerLeft);
        assert!(session.tooltip.hidden);

        // A feature the surface never drew resolves to nothing.
        session.handle(Event::PointerEntered("77".to_string()));
        assert!(session.tooltip.hidden);
    }
}
