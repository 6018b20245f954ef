//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Sim time only advances through `Simulation::tick`
//! - Seeded RNG only, drawn in a fixed order
//! - Pitcher data comes from a `RosterProvider`, never from globals
//! - No rendering or platform dependencies

pub mod at_bat;
pub mod play_mode;
pub mod profile;
pub mod random;
pub mod snapshot;
pub mod state;
pub mod swing;
pub mod tick;
pub mod trajectory;

pub use play_mode::{PlayMode, Rotation};
pub use profile::{PitchProfile, ProfileSet};
pub use snapshot::{PhaseKind, PlayProgress, Snapshot};
pub use state::{
    AimLock, AtBatCounters, Cursor, GameEvent, GameMode, GameResult, GameState, Outcome, Phase,
    PitchInstance, Scoreboard, SwingAttempt,
};
pub use swing::{Matchup, SwingJudgement, TimingBand};
pub use tick::{Command, SessionSetup, Simulation};
pub use trajectory::{Classification, Solution, Trajectory};
