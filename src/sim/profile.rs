//! Pitch profiles and the per-pitcher profile set

use std::collections::{BTreeMap, HashMap};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random;
use crate::consts::INCHES_PER_FOOT;
use crate::error::SimError;

/// Name of the substitute pitch used when a pitcher has no data
pub const DEFAULT_PITCH_TYPE: &str = "4SEAMFAST";
pub const DEFAULT_RELEASE_LATERAL_FT: f64 = -2.0;
pub const DEFAULT_RELEASE_VERTICAL_FT: f64 = 6.0;
pub const DEFAULT_SPEED_MPH: f64 = 90.0;

/// Tabulated flight characteristics of one pitch type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchProfile {
    pub pitch_type: String,
    /// Release point (lateral, vertical) in feet
    pub release: DVec2,
    /// Release speed in mph
    pub speed_mph: f64,
    /// Total lateral break over the flight, inches
    pub horizontal_movement_in: f64,
    /// Total vertical break over the flight, inches
    pub vertical_movement_in: f64,
}

impl PitchProfile {
    /// Straight 90 mph fastball from a fixed release point
    pub fn default_profile() -> Self {
        Self {
            pitch_type: DEFAULT_PITCH_TYPE.to_string(),
            release: DVec2::new(DEFAULT_RELEASE_LATERAL_FT, DEFAULT_RELEASE_VERTICAL_FT),
            speed_mph: DEFAULT_SPEED_MPH,
            horizontal_movement_in: 0.0,
            vertical_movement_in: 0.0,
        }
    }

    /// Movement converted to feet (lateral, vertical)
    pub fn movement_ft(&self) -> DVec2 {
        DVec2::new(self.horizontal_movement_in, self.vertical_movement_in) / INCHES_PER_FOOT
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: &str| SimError::InvalidProfile {
            pitch_type: self.pitch_type.clone(),
            reason: reason.to_string(),
        };
        if !self.speed_mph.is_finite() || self.speed_mph <= 0.0 {
            return Err(invalid("speed must be positive"));
        }
        if !self.release.is_finite() {
            return Err(invalid("release point must be finite"));
        }
        if !self.horizontal_movement_in.is_finite() || !self.vertical_movement_in.is_finite() {
            return Err(invalid("movement must be finite"));
        }
        Ok(())
    }
}

/// The active pitcher's arsenal, keyed by pitch type.
///
/// Never empty: a pitcher without usable data gets the default profile.
/// Iteration order is sorted by name so number-key selection is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    profiles: BTreeMap<String, PitchProfile>,
    /// First profile in name order, used for fallbacks
    fallback: PitchProfile,
    substituted_default: bool,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::from_profiles(Vec::new())
    }
}

impl ProfileSet {
    /// Build from a provider mapping, dropping profiles that fail validation
    pub fn new(map: HashMap<String, PitchProfile>) -> Self {
        Self::from_profiles(map.into_iter().map(|(name, mut profile)| {
            profile.pitch_type = name;
            profile
        }))
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = PitchProfile>) -> Self {
        let mut valid = BTreeMap::new();
        for profile in profiles {
            match profile.validate() {
                Ok(()) => {
                    valid.insert(profile.pitch_type.clone(), profile);
                }
                Err(err) => log::warn!("Dropping pitch profile: {}", err),
            }
        }

        let substituted_default = valid.is_empty();
        let fallback = match valid.values().next() {
            Some(first) => first.clone(),
            None => {
                log::warn!("No usable pitch data; substituting default {}", DEFAULT_PITCH_TYPE);
                let profile = PitchProfile::default_profile();
                valid.insert(profile.pitch_type.clone(), profile.clone());
                profile
            }
        };

        Self {
            profiles: valid,
            fallback,
            substituted_default,
        }
    }

    /// True when the provider supplied nothing usable
    pub fn is_default_substitute(&self) -> bool {
        self.substituted_default
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, pitch_type: &str) -> bool {
        self.profiles.contains_key(pitch_type)
    }

    pub fn get(&self, pitch_type: &str) -> Option<&PitchProfile> {
        self.profiles.get(pitch_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Pitch type bound to number key `n` (1-based)
    pub fn name_at(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.names().nth(i))
    }

    /// Look up a profile, falling back to any available one
    pub fn resolve(&self, pitch_type: &str) -> &PitchProfile {
        match self.profiles.get(pitch_type) {
            Some(profile) => profile,
            None => {
                let fallback = self.first();
                log::debug!(
                    "Pitch type {} unavailable, using {}",
                    pitch_type,
                    fallback.pitch_type
                );
                fallback
            }
        }
    }

    /// First profile in name order; also the pre-pitch tell's release point
    pub fn first(&self) -> &PitchProfile {
        &self.fallback
    }

    /// Uniformly random pitch type
    pub fn random_pitch<R: Rng + ?Sized>(&self, rng: &mut R) -> &PitchProfile {
        let index = random::index(rng, self.profiles.len());
        self.profiles.values().nth(index).unwrap_or_else(|| self.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::ScriptedRng;

    fn profile(name: &str, speed: f64) -> PitchProfile {
        PitchProfile {
            pitch_type: name.to_string(),
            release: DVec2::new(-2.0, 6.0),
            speed_mph: speed,
            horizontal_movement_in: -6.0,
            vertical_movement_in: 12.0,
        }
    }

    #[test]
    fn test_empty_set_substitutes_default() {
        let set = ProfileSet::new(HashMap::new());
        assert!(set.is_default_substitute());
        assert_eq!(set.len(), 1);
        let p = set.resolve("SLIDER");
        assert_eq!(p.pitch_type, DEFAULT_PITCH_TYPE);
        assert_eq!(p.speed_mph, 90.0);
        assert_eq!(p.movement_ft(), DVec2::ZERO);
        assert_eq!(p.release, DVec2::new(-2.0, 6.0));
    }

    #[test]
    fn test_invalid_profiles_are_dropped() {
        let set = ProfileSet::from_profiles([profile("FF", 95.0), profile("BAD", 0.0)]);
        assert!(!set.is_default_substitute());
        assert!(set.contains("FF"));
        assert!(!set.contains("BAD"));
    }

    #[test]
    fn test_resolve_falls_back_to_available() {
        let set = ProfileSet::from_profiles([profile("SL", 85.0)]);
        assert_eq!(set.resolve("CU").pitch_type, "SL");
    }

    #[test]
    fn test_map_keys_win_over_embedded_names() {
        let mut map = HashMap::new();
        map.insert("CH".to_string(), profile("whatever", 84.0));
        let set = ProfileSet::new(map);
        assert_eq!(set.get("CH").unwrap().pitch_type, "CH");
    }

    #[test]
    fn test_name_at_is_sorted_and_one_based() {
        let set = ProfileSet::from_profiles([profile("SL", 85.0), profile("CH", 84.0), profile("FF", 95.0)]);
        assert_eq!(set.name_at(1), Some("CH"));
        assert_eq!(set.name_at(3), Some("SL"));
        assert_eq!(set.name_at(0), None);
        assert_eq!(set.name_at(4), None);
    }

    #[test]
    fn test_random_pitch_uses_unit_draw() {
        let set = ProfileSet::from_profiles([profile("A", 90.0), profile("B", 90.0), profile("C", 90.0)]);
        let mut rng = ScriptedRng::new(&[0.0, 0.5, 0.99]);
        assert_eq!(set.random_pitch(&mut rng).pitch_type, "A");
        assert_eq!(set.random_pitch(&mut rng).pitch_type, "B");
        assert_eq!(set.random_pitch(&mut rng).pitch_type, "C");
    }
}
