//! Read-only view of the simulation for rendering/UI collaborators

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::state::{AtBatCounters, GameMode, GameState, Phase, Scoreboard};
use super::trajectory::Classification;
use crate::consts::{COUNTDOWN_TICKS, MAX_OUTS, TARGET_HITS, TELL_ON_TICKS, TICK_RATE_HZ};

/// Coarse phase for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Idle,
    Aiming,
    AimLocked,
    Countdown,
    Tell,
    InFlight,
    Arrived,
    GameOver,
}

impl From<&Phase> for PhaseKind {
    fn from(phase: &Phase) -> Self {
        match phase {
            Phase::Idle => PhaseKind::Idle,
            Phase::Aiming { .. } => PhaseKind::Aiming,
            Phase::AimLocked { .. } => PhaseKind::AimLocked,
            Phase::Countdown { .. } => PhaseKind::Countdown,
            Phase::Tell { .. } => PhaseKind::Tell,
            Phase::InFlight(_) => PhaseKind::InFlight,
            Phase::Arrived(_) => PhaseKind::Arrived,
            Phase::GameOver { .. } => PhaseKind::GameOver,
        }
    }
}

/// Play-mode progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayProgress {
    pub hits: u32,
    pub target_hits: usize,
    pub outs: u32,
    pub max_outs: u32,
    pub opponent_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: GameMode,
    pub phase: PhaseKind,
    pub paused: bool,
    pub time_ticks: u64,
    pub ball_position: DVec3,
    pub trajectory_len: usize,
    pub cursor_index: usize,
    /// Pitch type being thrown or selected
    pub pitch_type: Option<String>,
    pub pitch_speed_mph: Option<f64>,
    /// Only revealed once the pitch arrives
    pub classification: Option<Classification>,
    pub aim_target: DVec2,
    pub aim_center: Option<DVec2>,
    pub aim_radius: Option<f64>,
    /// Whole seconds shown on the countdown
    pub countdown_seconds: Option<u32>,
    pub tell_visible: bool,
    pub counters: AtBatCounters,
    pub scoreboard: Scoreboard,
    pub play: Option<PlayProgress>,
    pub opponent_name: Option<String>,
    pub available_pitches: Vec<String>,
    pub last_outcome: Option<String>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let pitch = state.pitch();

        let (pitch_type, aim_center, aim_radius) = match &state.phase {
            Phase::Aiming { pitch_type } => (Some(pitch_type.clone()), None, None),
            Phase::AimLocked { pitch_type, lock } => {
                (Some(pitch_type.clone()), Some(lock.center), Some(lock.radius))
            }
            _ => (pitch.map(|p| p.pitch_type().to_string()), None, None),
        };
        let pitch_speed_mph = match pitch {
            Some(p) => Some(p.profile.speed_mph),
            None => pitch_type
                .as_deref()
                .and_then(|name| state.profiles.get(name))
                .map(|p| p.speed_mph),
        };

        let countdown_seconds = match state.phase {
            Phase::Countdown { ticks_left } => {
                Some(ticks_left.min(COUNTDOWN_TICKS) / TICK_RATE_HZ + 1)
            }
            _ => None,
        };
        let tell_visible = matches!(state.phase, Phase::Tell { ticks } if ticks < TELL_ON_TICKS);

        let classification = match &state.phase {
            Phase::Arrived(p) => Some(p.classification),
            _ => None,
        };

        let play = state.play.as_ref().map(|play| PlayProgress {
            hits: state.scoreboard.hits,
            target_hits: TARGET_HITS,
            outs: state.scoreboard.outs,
            max_outs: MAX_OUTS,
            opponent_index: play.current_index(),
        });

        Self {
            mode: state.mode,
            phase: PhaseKind::from(&state.phase),
            paused: state.paused,
            time_ticks: state.time_ticks,
            ball_position: state.ball_position(),
            trajectory_len: pitch.map_or(0, |p| p.trajectory.len()),
            cursor_index: pitch.map_or(0, |p| p.cursor.index),
            pitch_type,
            pitch_speed_mph,
            classification,
            aim_target: state.aim,
            aim_center,
            aim_radius,
            countdown_seconds,
            tell_visible,
            counters: state.counters,
            scoreboard: state.scoreboard,
            play,
            opponent_name: state.opponent.as_ref().map(|o| o.name.clone()),
            available_pitches: state.profiles.names().map(str::to_string).collect(),
            last_outcome: state.last_outcome.map(|o| o.label()),
        }
    }
}
