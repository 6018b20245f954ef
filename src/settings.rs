//! Runtime settings
//!
//! Loaded from a JSON file next to the binary. Everything the sim treats as a
//! fixed rule lives in `consts`; only tunables live here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BATTER_ACCURACY, BATTER_POWER, TICK_RATE_HZ};
use crate::error::SimError;

/// Batter ratings used by the hit probability model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterStats {
    pub power: f64,
    pub accuracy: f64,
}

impl Default for BatterStats {
    fn default() -> Self {
        Self {
            power: BATTER_POWER,
            accuracy: BATTER_ACCURACY,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed RNG seed (None = driver picks one)
    pub seed: Option<u64>,
    /// Driver tick rate
    pub tick_rate_hz: u32,
    /// Batter ratings
    pub batter: BatterStats,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            tick_rate_hz: TICK_RATE_HZ,
            batter: BatterStats::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({}: {})", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_rate_hz == 0 {
            return Err(SimError::InvalidSettings("tick_rate_hz must be positive".into()));
        }
        if !self.batter.power.is_finite() || !self.batter.accuracy.is_finite() {
            return Err(SimError::InvalidSettings("batter stats must be finite".into()));
        }
        Ok(())
    }

    /// Seconds per driver tick
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate_hz.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tick_rate_hz, 60);
        assert_eq!(settings.batter, BatterStats::default());
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let err = Settings::from_json(r#"{ "tick_rate_hz": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidSettings(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/definitely/not/here.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_tick_dt() {
        let settings = Settings::default();
        assert!((settings.tick_dt() - 1.0 / 60.0).abs() < 1e-12);
    }
}
