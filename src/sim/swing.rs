//! Swing timing and hit resolution

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random;
use super::trajectory::Classification;
use crate::consts::*;
use crate::settings::BatterStats;

/// Timing band boundaries on the timing ratio
pub const TOO_EARLY_BELOW: f64 = 0.82;
pub const EARLY_BELOW: f64 = 0.86;
pub const BIT_EARLY_BELOW: f64 = 0.91;
pub const PERFECT_UP_TO: f64 = 0.97;
pub const BIT_LATE_UP_TO: f64 = 1.0;
pub const LATE_UP_TO: f64 = 1.04;

/// Ordered, non-overlapping timing bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimingBand {
    TooEarly,
    Early,
    BitEarly,
    Perfect,
    BitLate,
    Late,
    TooLate,
}

impl TimingBand {
    /// Classify a timing ratio.
    ///
    /// `[0.91, 0.97]` is Perfect; the early side is half-open toward the
    /// plate and the late side half-open toward the mound.
    pub fn classify(ratio: f64) -> Self {
        if ratio < TOO_EARLY_BELOW {
            TimingBand::TooEarly
        } else if ratio < EARLY_BELOW {
            TimingBand::Early
        } else if ratio < BIT_EARLY_BELOW {
            TimingBand::BitEarly
        } else if ratio <= PERFECT_UP_TO {
            TimingBand::Perfect
        } else if ratio <= BIT_LATE_UP_TO {
            TimingBand::BitLate
        } else if ratio <= LATE_UP_TO {
            TimingBand::Late
        } else {
            // NaN lands here too
            TimingBand::TooLate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimingBand::TooEarly => "Too Early",
            TimingBand::Early => "Early",
            TimingBand::BitEarly => "A bit early",
            TimingBand::Perfect => "Perfect",
            TimingBand::BitLate => "A bit late",
            TimingBand::Late => "Late",
            TimingBand::TooLate => "Too Late",
        }
    }

    /// Base hit modifier against a strike / a ball. None = automatic miss.
    pub fn modifiers(&self) -> Option<(f64, f64)> {
        match self {
            TimingBand::Perfect => Some((0.6, 0.1)),
            TimingBand::BitEarly | TimingBand::BitLate => Some((0.2, 0.05)),
            TimingBand::Early | TimingBand::Late => Some((0.1, 0.0)),
            TimingBand::TooEarly | TimingBand::TooLate => None,
        }
    }

    pub fn modifier(&self, classification: Classification) -> Option<f64> {
        self.modifiers().map(|(strike, ball)| match classification {
            Classification::Strike => strike,
            Classification::Ball => ball,
        })
    }
}

/// Fraction of the release-to-plate depth covered at `current_depth`
pub fn timing_ratio(start_depth: f64, current_depth: f64) -> f64 {
    (start_depth - current_depth) / (start_depth - PLATE_FRONT_DEPTH_FT)
}

/// Who is on the mound, as far as the probability model cares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub batter: BatterStats,
    pub pitcher_stuff: f64,
    pub pitch_speed_mph: f64,
}

impl Matchup {
    /// Rating edge of the batter, scaled into probability units
    pub fn stat_edge(&self) -> f64 {
        ((self.batter.power - self.pitcher_stuff) + (self.batter.accuracy - self.pitch_speed_mph))
            * STAT_WEIGHT
    }
}

/// `modifier + stat edge`, clamped to [0.05, 0.95]
pub fn hit_probability(modifier: f64, matchup: &Matchup) -> f64 {
    let p = modifier + matchup.stat_edge();
    if p.is_nan() {
        return MIN_HIT_PROBABILITY;
    }
    p.clamp(MIN_HIT_PROBABILITY, MAX_HIT_PROBABILITY)
}

/// Roll against `probability`
pub fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    random::unit(rng) < probability
}

/// Result of judging one swing, before counts are applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingJudgement {
    pub ratio: f64,
    pub band: TimingBand,
    /// Hit chance used, None for automatic misses
    pub probability: Option<f64>,
    pub hit: bool,
    /// Ball put in play for an out (only rolled on a non-hit)
    pub in_play_out: bool,
}

/// Judge a swing at `ratio` against a pitch classified `classification`.
///
/// Draws: one hit roll, then (on a miss) one in-play-out roll. Too Early and
/// Too Late draw nothing.
pub fn judge<R: Rng + ?Sized>(
    rng: &mut R,
    ratio: f64,
    classification: Classification,
    matchup: &Matchup,
) -> SwingJudgement {
    let band = TimingBand::classify(ratio);
    let Some(modifier) = band.modifier(classification) else {
        return SwingJudgement {
            ratio,
            band,
            probability: None,
            hit: false,
            in_play_out: false,
        };
    };

    let probability = hit_probability(modifier, matchup);
    let hit = roll(rng, probability);
    let in_play_out = !hit && roll(rng, hit_probability(IN_PLAY_OUT_MODIFIER, matchup));

    SwingJudgement {
        ratio,
        band,
        probability: Some(probability),
        hit,
        in_play_out,
    }
}
