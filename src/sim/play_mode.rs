//! Multi-pitcher play mode
//!
//! The batter faces `TARGET_HITS` distinct pitchers in a random order. Each
//! hit or walk sends the next pitcher out; getting past the last one wins,
//! reaching `MAX_OUTS` loses.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random;
use super::state::{GameResult, Scoreboard};
use crate::consts::{MAX_OUTS, TARGET_HITS};
use crate::error::SimError;
use crate::roster::Opponent;

/// What happens after a hit
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    Next(Opponent),
    Victory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayMode {
    opponents: Vec<Opponent>,
    current: usize,
}

impl PlayMode {
    /// Draw `TARGET_HITS` distinct pitchers from the roster.
    ///
    /// Fails without consuming randomness if the roster is too small.
    pub fn start<R: Rng + ?Sized>(roster: Vec<Opponent>, rng: &mut R) -> Result<Self, SimError> {
        let mut pool: Vec<Opponent> = Vec::with_capacity(roster.len());
        for opponent in roster {
            if !pool.iter().any(|o| o.id == opponent.id) {
                pool.push(opponent);
            }
        }
        if pool.len() < TARGET_HITS {
            return Err(SimError::InsufficientRoster {
                needed: TARGET_HITS,
                available: pool.len(),
            });
        }

        // Partial Fisher-Yates
        for i in 0..TARGET_HITS {
            let j = i + random::index(rng, pool.len() - i);
            pool.swap(i, j);
        }
        pool.truncate(TARGET_HITS);

        log::info!(
            "Play mode lineup: {}",
            pool.iter().map(|o| o.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self {
            opponents: pool,
            current: 0,
        })
    }

    pub fn opponents(&self) -> &[Opponent] {
        &self.opponents
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Opponent> {
        self.opponents.get(self.current)
    }

    /// Move on after a hit or walk
    pub fn record_hit(&mut self) -> Rotation {
        self.current += 1;
        match self.opponents.get(self.current) {
            Some(next) => Rotation::Next(next.clone()),
            None => Rotation::Victory,
        }
    }

    /// Check the out limit after an out
    pub fn check_defeat(&self, scoreboard: &Scoreboard) -> Option<GameResult> {
        (scoreboard.outs >= MAX_OUTS).then_some(GameResult::Defeat)
    }
}
