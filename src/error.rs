//! Crate error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid pitch profile {pitch_type}: {reason}")]
    InvalidProfile { pitch_type: String, reason: String },

    #[error("degenerate flight: speed {speed_mph} mph gives flight time {flight_time}s")]
    DegenerateFlight { speed_mph: f64, flight_time: f64 },

    #[error("pitch type {0} is not in the current arsenal")]
    UnknownPitchType(String),

    #[error("play mode needs at least {needed} distinct pitchers, roster has {available}")]
    InsufficientRoster { needed: usize, available: usize },

    #[error("{command} is not accepted while {phase}")]
    CommandNotAccepted {
        command: &'static str,
        phase: &'static str,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Rejections that leave the simulation untouched and can simply be ignored by a driver
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SimError::UnknownPitchType(_) | SimError::CommandNotAccepted { .. }
        )
    }
}
