//! Simulation state and core types
//!
//! Everything the tick function mutates lives in `GameState`.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::play_mode::PlayMode;
use super::profile::{PitchProfile, ProfileSet};
use super::swing::TimingBand;
use super::trajectory::{Classification, Trajectory};
use crate::consts::*;
use crate::roster::Opponent;

/// Which game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Player pitches: select, aim, lock, throw
    Pitching,
    /// Player bats against a single pitcher
    Hitting,
    /// Player bats through a queue of pitchers
    Play,
}

impl GameMode {
    /// Pitches are thrown by the sim and swings are judged
    pub fn is_automatic(&self) -> bool {
        !matches!(self, GameMode::Pitching)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Pitching => "Pitching Mode",
            GameMode::Hitting => "Hitting Mode",
            GameMode::Play => "Play Mode",
        }
    }
}

/// Final result of a play-mode session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Victory,
    Defeat,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Victory => "Victory!",
            GameResult::Defeat => "Defeat!",
        }
    }
}

/// Shrinking aim circle (manual mode)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimLock {
    pub center: DVec2,
    pub radius: f64,
    /// Sim time the lock started
    pub started_us: u64,
}

impl AimLock {
    pub fn new(center: DVec2, now_us: u64) -> Self {
        Self {
            center,
            radius: MAX_AIM_RADIUS_FT,
            started_us: now_us,
        }
    }

    /// Shrink linearly from max to min radius. Returns true once the lock has expired.
    pub fn update(&mut self, now_us: u64) -> bool {
        let elapsed = now_us.saturating_sub(self.started_us);
        if elapsed >= AIM_SHRINK_DURATION_US {
            self.radius = MIN_AIM_RADIUS_FT;
            return true;
        }
        let progress = elapsed as f64 / AIM_SHRINK_DURATION_US as f64;
        self.radius = MAX_AIM_RADIUS_FT - progress * (MAX_AIM_RADIUS_FT - MIN_AIM_RADIUS_FT);
        false
    }
}

/// Swing taken during a pitch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingAttempt {
    /// Time since the pitch was released
    pub at_us: u64,
    pub ratio: f64,
    pub band: TimingBand,
    pub outcome: Outcome,
}

/// Playback position within a trajectory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub index: usize,
    pub elapsed_us: u64,
}

/// The pitch currently in the air (or just arrived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchInstance {
    pub profile: PitchProfile,
    pub target: DVec2,
    /// Aim circle radius the target was drawn from (manual mode)
    pub aim_radius: Option<f64>,
    pub trajectory: Trajectory,
    pub classification: Classification,
    pub cursor: Cursor,
    pub swing: Option<SwingAttempt>,
}

impl PitchInstance {
    pub fn pitch_type(&self) -> &str {
        &self.profile.pitch_type
    }

    pub fn position(&self) -> DVec3 {
        self.trajectory.at(self.cursor.index)
    }

    pub fn at_plate(&self) -> bool {
        self.cursor.index >= self.trajectory.last_index()
    }

    /// Move the cursor forward by `dt_us` of flight time
    pub fn advance(&mut self, dt_us: u64) {
        self.cursor.elapsed_us = self.cursor.elapsed_us.saturating_add(dt_us);
        let steps = (self.cursor.elapsed_us / INTEGRATION_DT_US) as usize;
        self.cursor.index = steps.min(self.trajectory.last_index());
    }
}

/// Closed set of pitch phases.
///
/// Manual: Idle → Aiming → AimLocked → InFlight → Arrived.
/// Automatic: Countdown → Tell → InFlight → Arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    /// Pitch type chosen, aim reticle follows the pointer
    Aiming { pitch_type: String },
    /// Aim circle shrinking around the locked centre
    AimLocked { pitch_type: String, lock: AimLock },
    Countdown { ticks_left: u32 },
    /// Pre-pitch flicker cue
    Tell { ticks: u32 },
    InFlight(PitchInstance),
    Arrived(PitchInstance),
    GameOver { result: GameResult },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Aiming { .. } => "aiming",
            Phase::AimLocked { .. } => "aim locked",
            Phase::Countdown { .. } => "counting down",
            Phase::Tell { .. } => "showing the tell",
            Phase::InFlight(_) => "in flight",
            Phase::Arrived(_) => "arrived",
            Phase::GameOver { .. } => "game over",
        }
    }

    pub fn pitch(&self) -> Option<&PitchInstance> {
        match self {
            Phase::InFlight(pitch) | Phase::Arrived(pitch) => Some(pitch),
            _ => None,
        }
    }
}

/// Balls and strikes for the current batter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBatCounters {
    pub strikes: u8,
    pub balls: u8,
}

impl AtBatCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_fresh(&self) -> bool {
        self.strikes == 0 && self.balls == 0
    }
}

/// Session tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub hits: u32,
    pub outs: u32,
}

/// How a pitch (or at-bat) ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Taken pitch in the zone
    CalledStrike,
    /// Taken pitch out of the zone
    Ball,
    /// Third strike, looking or swinging
    Strikeout { band: Option<TimingBand> },
    /// Fourth ball; counts as a hit
    Walk,
    Hit { band: TimingBand },
    /// Swing and miss that doesn't end the at-bat
    SwingStrike { band: TimingBand },
    /// Contact, but the ball is caught
    InPlayOut { band: TimingBand },
    /// Too Early / Too Late miss that doesn't end the at-bat
    Mistimed { band: TimingBand },
}

impl Outcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit { .. } | Outcome::Walk)
    }

    pub fn is_out(&self) -> bool {
        matches!(self, Outcome::Strikeout { .. } | Outcome::InPlayOut { .. })
    }

    /// Ends the at-bat
    pub fn is_terminal(&self) -> bool {
        self.is_hit() || self.is_out()
    }

    pub fn label(&self) -> String {
        match self {
            Outcome::CalledStrike => "Strike".to_string(),
            Outcome::Ball => "Ball".to_string(),
            Outcome::Strikeout { band: None } => "Strikeout!".to_string(),
            Outcome::Strikeout { band: Some(band) } => format!("{}, Strikeout!", band.as_str()),
            Outcome::Walk => "Walk! (Hit)".to_string(),
            Outcome::Hit { band } => format!("Hit! {}", band.as_str()),
            Outcome::SwingStrike { band } => format!("{}, Swing Strike!", band.as_str()),
            Outcome::InPlayOut { band } => format!("{}, In Play OUT !", band.as_str()),
            Outcome::Mistimed { band } => band.as_str().to_string(),
        }
    }
}

/// Discrete notifications for UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PitchThrown {
        pitch_type: String,
        speed_mph: f64,
    },
    PitchArrived {
        classification: Classification,
    },
    /// A taken pitch was counted
    PitchCalled {
        outcome: Outcome,
    },
    SwingResolved {
        outcome: Outcome,
        hit: bool,
        out: bool,
    },
    AtBatReset,
    OpponentChanged {
        opponent: Opponent,
        profiles: ProfileSet,
    },
    GameEnded {
        result: GameResult,
        outs: u32,
        hits: u32,
    },
    Paused(bool),
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub phase: Phase,
    pub paused: bool,
    /// Sim time in microseconds (only advances on unpaused ticks)
    pub time_us: u64,
    pub time_ticks: u64,
    /// Aim reticle position (manual mode)
    pub aim: DVec2,
    pub counters: AtBatCounters,
    pub scoreboard: Scoreboard,
    pub opponent: Option<Opponent>,
    pub profiles: ProfileSet,
    pub play: Option<PlayMode>,
    pub last_outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(mode: GameMode, opponent: Option<Opponent>, profiles: ProfileSet) -> Self {
        let phase = if mode.is_automatic() {
            Phase::Countdown {
                ticks_left: COUNTDOWN_TICKS,
            }
        } else {
            Phase::Idle
        };
        Self {
            mode,
            phase,
            paused: false,
            time_us: 0,
            time_ticks: 0,
            aim: DVec2::new(DEFAULT_AIM_LATERAL_FT, DEFAULT_AIM_VERTICAL_FT),
            counters: AtBatCounters::default(),
            scoreboard: Scoreboard::default(),
            opponent,
            profiles,
            play: None,
            last_outcome: None,
        }
    }

    pub fn pitch(&self) -> Option<&PitchInstance> {
        self.phase.pitch()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// Ball position: in the air, or resting at the release point
    pub fn ball_position(&self) -> DVec3 {
        match self.pitch() {
            Some(pitch) => pitch.position(),
            None => self.profiles.first().release.extend(RELEASE_DEPTH_FT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_lock_shrinks_linearly() {
        let mut lock = AimLock::new(DVec2::new(0.0, 2.5), 1_000);
        assert!(!lock.update(1_000));
        assert_eq!(lock.radius, MAX_AIM_RADIUS_FT);
        assert!(!lock.update(1_000 + 350_000));
        assert!((lock.radius - 0.85).abs() < 1e-12);
        assert!(lock.update(1_000 + AIM_SHRINK_DURATION_US));
        assert_eq!(lock.radius, MIN_AIM_RADIUS_FT);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Walk.label(), "Walk! (Hit)");
        assert_eq!(Outcome::Strikeout { band: None }.label(), "Strikeout!");
        assert_eq!(
            Outcome::InPlayOut { band: TimingBand::Perfect }.label(),
            "Perfect, In Play OUT !"
        );
        assert_eq!(Outcome::Hit { band: TimingBand::BitLate }.label(), "Hit! A bit late");
        assert_eq!(Outcome::Mistimed { band: TimingBand::TooEarly }.label(), "Too Early");
    }

    #[test]
    fn test_outcome_classes() {
        assert!(Outcome::Walk.is_hit());
        assert!(Outcome::InPlayOut { band: TimingBand::Early }.is_out());
        assert!(!Outcome::SwingStrike { band: TimingBand::Early }.is_terminal());
        assert!(!Outcome::Ball.is_terminal());
    }

    #[test]
    fn test_new_state_phase_by_mode() {
        let state = GameState::new(GameMode::Hitting, None, ProfileSet::default());
        assert_eq!(state.phase, Phase::Countdown { ticks_left: COUNTDOWN_TICKS });
        let state = GameState::new(GameMode::Pitching, None, ProfileSet::default());
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.ball_position().z, RELEASE_DEPTH_FT);
    }
}
