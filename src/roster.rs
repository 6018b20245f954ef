//! Pitcher roster and pitch data
//!
//! The sim never owns pitcher records; it asks a `RosterProvider` for them.
//! `InMemoryRoster` is the stock provider, loadable from JSON.

use std::collections::HashMap;
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::PitchProfile;

/// A pitcher the batter can face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opponent {
    pub id: u32,
    pub name: String,
    /// Pitch quality rating (higher = harder to hit)
    pub stuff: f64,
    /// Typical velocity (mph), used when the pitch speed is unknown
    pub velocity: f64,
}

/// Source of pitcher records and their pitch data
pub trait RosterProvider {
    /// Pitch profiles for a pitcher, keyed by pitch type (may be empty)
    fn profiles(&self, pitcher_id: u32) -> HashMap<String, PitchProfile>;

    /// Every pitcher on file
    fn opponents(&self) -> Vec<Opponent>;
}

impl<T: RosterProvider + ?Sized> RosterProvider for &T {
    fn profiles(&self, pitcher_id: u32) -> HashMap<String, PitchProfile> {
        (**self).profiles(pitcher_id)
    }

    fn opponents(&self) -> Vec<Opponent> {
        (**self).opponents()
    }
}

/// One pitcher and their arsenal, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub opponent: Opponent,
    #[serde(default)]
    pub pitches: Vec<PitchProfile>,
}

/// Roster held in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryRoster {
    pub pitchers: Vec<RosterEntry>,
}

impl InMemoryRoster {
    pub fn new(pitchers: Vec<RosterEntry>) -> Self {
        Self { pitchers }
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let roster = Self::from_json(&json)?;
        log::info!(
            "Loaded {} pitchers from {}",
            roster.pitchers.len(),
            path.as_ref().display()
        );
        Ok(roster)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn opponent(&self, id: u32) -> Option<&Opponent> {
        self.pitchers.iter().map(|p| &p.opponent).find(|o| o.id == id)
    }

    /// Built-in roster of four pitchers
    pub fn sample() -> Self {
        fn pitch(name: &str, release: (f64, f64), speed: f64, hmov: f64, vmov: f64) -> PitchProfile {
            PitchProfile {
                pitch_type: name.to_string(),
                release: DVec2::new(release.0, release.1),
                speed_mph: speed,
                horizontal_movement_in: hmov,
                vertical_movement_in: vmov,
            }
        }
        fn entry(id: u32, name: &str, stuff: f64, velocity: f64, pitches: Vec<PitchProfile>) -> RosterEntry {
            RosterEntry {
                opponent: Opponent {
                    id,
                    name: name.to_string(),
                    stuff,
                    velocity,
                },
                pitches,
            }
        }

        Self::new(vec![
            entry(
                1,
                "Hideo Arakawa",
                72.0,
                96.0,
                vec![
                    pitch("4SEAMFAST", (-2.1, 5.9), 96.8, -5.8, 16.2),
                    pitch("SPLITTER", (-2.2, 5.8), 87.5, -8.4, 3.1),
                    pitch("SLIDER", (-2.2, 5.8), 86.1, 4.9, 1.2),
                ],
            ),
            entry(
                2,
                "Marcus Bell",
                61.0,
                93.0,
                vec![
                    pitch("SINKER", (1.9, 5.6), 93.4, 14.6, 8.2),
                    pitch("CHANGEUP", (1.9, 5.6), 84.0, 13.9, 5.5),
                    pitch("CURVEBALL", (2.0, 5.9), 78.9, -7.7, -9.8),
                ],
            ),
            entry(
                3,
                "Tomas Quintero",
                55.0,
                91.0,
                vec![
                    pitch("4SEAMFAST", (-1.7, 6.2), 91.5, -7.1, 15.0),
                    pitch("CUTTER", (-1.7, 6.1), 88.3, 2.6, 8.9),
                ],
            ),
            entry(
                4,
                "Eli Navarro",
                48.0,
                89.0,
                vec![
                    pitch("SINKER", (-2.4, 5.5), 89.2, -15.3, 7.6),
                    pitch("SWEEPER", (-2.5, 5.4), 81.7, 15.8, 0.4),
                ],
            ),
        ])
    }
}

impl RosterProvider for InMemoryRoster {
    fn profiles(&self, pitcher_id: u32) -> HashMap<String, PitchProfile> {
        self.pitchers
            .iter()
            .filter(|p| p.opponent.id == pitcher_id)
            .flat_map(|p| p.pitches.iter())
            .map(|pitch| (pitch.pitch_type.clone(), pitch.clone()))
            .collect()
    }

    fn opponents(&self) -> Vec<Opponent> {
        self.pitchers.iter().map(|p| p.opponent.clone()).collect()
    }
}
