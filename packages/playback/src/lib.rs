#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Auto-play timer control.
//!
//! An explicit two-state machine (stopped/playing) holding both a
//! cancellation handle and a generation counter. Stopping aborts the timer
//! task *and* bumps the generation, so a tick that was already queued on
//! the session channel arrives stale and is ignored; cancellation never
//! depends on a flag checked after the fact.

use std::time::Duration;

use aqi_map_models::Event;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default tick period for auto-play.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

/// What the session should do with an incoming tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// The tick is stale (or playback already stopped); ignore it.
    Ignore,
    /// Advance the month index by one and render.
    Advance,
    /// The last month was already reached; playback has stopped without
    /// advancing.
    Finish,
}

/// The playback state machine.
pub struct PlaybackController {
    playing: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    period: Duration,
}

impl PlaybackController {
    /// A stopped controller ticking at `period` once started.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            playing: false,
            generation: 0,
            timer: None,
            period,
        }
    }

    /// Whether playback is currently running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Handles the play/pause toggle; returns whether playback is now
    /// running.
    ///
    /// Starting while already at the last month schedules nothing and
    /// stays stopped. Stopping cancels the timer so no further ticks fire.
    pub fn toggle(
        &mut self,
        month_index: usize,
        last_index: usize,
        events: &mpsc::Sender<Event>,
    ) -> bool {
        if self.playing {
            self.stop();
            return false;
        }

        if month_index >= last_index {
            log::debug!("Play requested at the final month; nothing to advance");
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let events = events.clone();
        let period = self.period;
        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first interval tick completes immediately; skip it so
            // the first advance happens one full period after toggle.
            interval.tick().await;
            loop {
                interval.tick().await;
                if events.send(Event::PlaybackTick { generation }).await.is_err() {
                    break;
                }
            }
        }));
        self.playing = true;
        log::info!("Playback started at month index {month_index}");
        true
    }

    /// Classifies an incoming tick against the current state.
    ///
    /// A tick at the last month stops playback without advancing.
    pub fn tick(&mut self, generation: u64, month_index: usize, last_index: usize) -> TickAction {
        if !self.playing || generation != self.generation {
            return TickAction::Ignore;
        }
        if month_index >= last_index {
            self.stop();
            return TickAction::Finish;
        }
        TickAction::Advance
    }

    /// Stops playback. Idempotent; aborts the timer task and invalidates
    /// any tick already in flight.
    pub fn stop(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if self.playing {
            log::info!("Playback stopped");
        }
        self.playing = false;
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
