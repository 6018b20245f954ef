//! Ball/strike bookkeeping
//!
//! Applies resolved pitches to the count and decides when an at-bat ends.
//! Callers handle what an ended at-bat means for the session.

use super::state::{AtBatCounters, Outcome, Scoreboard};
use super::swing::{SwingJudgement, TimingBand};
use super::trajectory::Classification;
use crate::consts::{MAX_BALLS, MAX_STRIKES};

/// Count a pitch the batter took
pub fn call_pitch(
    counters: &mut AtBatCounters,
    scoreboard: &mut Scoreboard,
    classification: Classification,
) -> Outcome {
    let outcome = match classification {
        Classification::Strike => {
            counters.strikes += 1;
            if counters.strikes >= MAX_STRIKES {
                Outcome::Strikeout { band: None }
            } else {
                Outcome::CalledStrike
            }
        }
        Classification::Ball => {
            counters.balls += 1;
            if counters.balls >= MAX_BALLS {
                Outcome::Walk
            } else {
                Outcome::Ball
            }
        }
    };
    settle(counters, scoreboard, outcome);
    outcome
}

/// Count a judged swing.
///
/// An in-play out ends the at-bat regardless of the strike count, and is
/// checked before the third-strike rule.
pub fn apply_swing(
    counters: &mut AtBatCounters,
    scoreboard: &mut Scoreboard,
    judgement: &SwingJudgement,
) -> Outcome {
    let band = judgement.band;
    let outcome = if judgement.hit {
        Outcome::Hit { band }
    } else {
        counters.strikes += 1;
        if judgement.in_play_out {
            Outcome::InPlayOut { band }
        } else if counters.strikes >= MAX_STRIKES {
            Outcome::Strikeout { band: Some(band) }
        } else if matches!(band, TimingBand::TooEarly | TimingBand::TooLate) {
            Outcome::Mistimed { band }
        } else {
            Outcome::SwingStrike { band }
        }
    };
    settle(counters, scoreboard, outcome);
    outcome
}

/// Tally terminal outcomes and clear the count
fn settle(counters: &mut AtBatCounters, scoreboard: &mut Scoreboard, outcome: Outcome) {
    if outcome.is_hit() {
        scoreboard.hits += 1;
    } else if outcome.is_out() {
        scoreboard.outs += 1;
    }
    if outcome.is_terminal() {
        counters.reset();
    }
}
