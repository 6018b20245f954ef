//! Strike Zone - A real-time pitch simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectory solving, pitch state machine, at-bat resolution)
//! - `clock`: Fixed-rate real-time driver that feeds bounded deltas into the sim
//! - `roster`: Pitcher/profile provider seams
//! - `settings`: Runtime configuration

pub mod clock;
pub mod error;
pub mod roster;
pub mod settings;
pub mod sim;

pub use clock::GameClock;
pub use error::SimError;
pub use roster::{InMemoryRoster, Opponent, RosterProvider};
pub use settings::{BatterStats, Settings};

use glam::DVec2;

/// Game configuration constants
///
/// Distances are in feet. Lateral is x (catcher's view, positive = right),
/// vertical is y (height above ground), depth is z (distance from home plate).
pub mod consts {
    /// Depth of the release point (pitcher's mound)
    pub const RELEASE_DEPTH_FT: f64 = 60.5;
    /// Depth of the front edge of home plate
    pub const PLATE_FRONT_DEPTH_FT: f64 = 1.417;
    /// Speed conversion, ft/s per mph
    pub const MPH_TO_FT_PER_SEC: f64 = 1.467;
    pub const INCHES_PER_FOOT: f64 = 12.0;

    /// Integration timestep for trajectory sampling (seconds)
    pub const INTEGRATION_DT: f64 = 0.005;
    pub const INTEGRATION_DT_US: u64 = 5_000;
    /// How far past the plate plane integration is allowed to run
    pub const PLATE_OVERSHOOT_FT: f64 = 0.1;
    /// Hard cap on samples per trajectory
    pub const MAX_TRAJECTORY_SAMPLES: usize = 2000;

    /// Strike zone (at the plate-front plane, inclusive bounds)
    pub const STRIKE_ZONE_LEFT_FT: f64 = -0.78;
    pub const STRIKE_ZONE_RIGHT_FT: f64 = 0.78;
    pub const STRIKE_ZONE_BOTTOM_FT: f64 = 1.3;
    pub const STRIKE_ZONE_TOP_FT: f64 = 3.1;

    /// Chance an automatic pitch is aimed inside the zone
    pub const AUTO_STRIKE_CHANCE: f64 = 0.6;
    /// Margin around the zone for automatic "ball" targets
    pub const BALL_TARGET_MARGIN_FT: f64 = 0.5;

    /// Manual aim target bounds
    pub const AIM_MIN_LATERAL_FT: f64 = -2.5;
    pub const AIM_MAX_LATERAL_FT: f64 = 2.5;
    pub const AIM_MIN_VERTICAL_FT: f64 = 0.0;
    pub const AIM_MAX_VERTICAL_FT: f64 = 5.0;
    pub const DEFAULT_AIM_LATERAL_FT: f64 = 0.0;
    pub const DEFAULT_AIM_VERTICAL_FT: f64 = 2.5;

    /// Aim-lock circle
    pub const MAX_AIM_RADIUS_FT: f64 = 1.5;
    pub const MIN_AIM_RADIUS_FT: f64 = 0.2;
    pub const AIM_SHRINK_DURATION_US: u64 = 700_000;

    /// Ticks before the next automatic pitch (3 seconds at 60 Hz)
    pub const COUNTDOWN_TICKS: u32 = 180;
    /// Pre-pitch tell rhythm (ticks)
    pub const TELL_ON_TICKS: u32 = 15;
    pub const TELL_OFF_TICKS: u32 = 15;
    pub const TELL_TICKS: u32 = TELL_ON_TICKS + TELL_OFF_TICKS;

    /// Nominal tick rate of the driver
    pub const TICK_RATE_HZ: u32 = 60;
    /// Largest elapsed time a single tick may consume (prevents huge catch-up steps)
    pub const MAX_FRAME_DT: f64 = 0.05;

    /// Count thresholds
    pub const MAX_STRIKES: u8 = 3;
    pub const MAX_BALLS: u8 = 4;
    pub const MAX_OUTS: u32 = 5;
    pub const TARGET_HITS: usize = 3;

    /// Batter and pitcher ratings
    pub const BATTER_POWER: f64 = 90.0;
    pub const BATTER_ACCURACY: f64 = 90.0;
    pub const DEFAULT_PITCHER_STUFF: f64 = 50.0;
    pub const DEFAULT_PITCHER_VELOCITY: f64 = 90.0;

    /// Hit probability model
    pub const STAT_WEIGHT: f64 = 0.005;
    pub const MIN_HIT_PROBABILITY: f64 = 0.05;
    pub const MAX_HIT_PROBABILITY: f64 = 0.95;
    pub const IN_PLAY_OUT_MODIFIER: f64 = 0.1;
}

/// Strike zone membership test at the plate plane (boundary-inclusive)
#[inline]
pub fn in_strike_zone(point: DVec2) -> bool {
    use consts::*;
    (STRIKE_ZONE_LEFT_FT..=STRIKE_ZONE_RIGHT_FT).contains(&point.x)
        && (STRIKE_ZONE_BOTTOM_FT..=STRIKE_ZONE_TOP_FT).contains(&point.y)
}

/// Clamp a point to the manual aim rectangle
#[inline]
pub fn clamp_to_aim_bounds(point: DVec2) -> DVec2 {
    use consts::*;
    DVec2::new(
        point.x.clamp(AIM_MIN_LATERAL_FT, AIM_MAX_LATERAL_FT),
        point.y.clamp(AIM_MIN_VERTICAL_FT, AIM_MAX_VERTICAL_FT),
    )
}

/// Convert polar (r, theta) to a cartesian offset
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
