//! Real-time tick driver
//!
//! Turns wall-clock timestamps into bounded elapsed-time deltas for
//! `Simulation::tick`. While paused no deltas are produced, and resuming
//! restarts the measurement so there is no catch-up step.

use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone)]
pub struct GameClock {
    tick_interval: Duration,
    last_tick: Option<Instant>,
    paused: bool,
}

impl GameClock {
    pub fn new(tick_rate_hz: u32) -> Self {
        Self {
            tick_interval: Duration::from_secs_f64(1.0 / tick_rate_hz.max(1) as f64),
            last_tick: None,
            paused: false,
        }
    }

    /// How long the driver should wait between ticks
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Start (or restart) measuring from `now`
    pub fn start(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    /// Elapsed seconds since the previous tick, capped at `MAX_FRAME_DT`.
    ///
    /// Returns `None` while paused. The first call after construction only
    /// records the timestamp and yields a zero delta.
    pub fn next_delta(&mut self, now: Instant) -> Option<f64> {
        if self.paused {
            return None;
        }
        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        Some(delta.min(MAX_FRAME_DT))
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume ticking; the next delta is measured from `now`
    pub fn resume(&mut self, now: Instant) {
        self.paused = false;
        self.last_tick = Some(now);
    }

    /// Follow the simulation's pause flag
    pub fn sync_paused(&mut self, paused: bool, now: Instant) {
        match (self.paused, paused) {
            (false, true) => self.pause(),
            (true, false) => self.resume(now),
            _ => {}
        }
    }
}
