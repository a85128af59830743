//! Computer opponent.
//!
//! The policy is deliberately beatable. With probability
//! [`DEFAULT_EXPLORATION_RATE`] it plays a uniformly random empty square.
//! Otherwise it completes its own two-in-a-row, then blocks the human's,
//! then falls back to a random empty square. It never searches deeper.

mod random;

pub use random::{RandomSource, ScriptedSource};

use crate::rules::WINNING_LINES;
use crate::{Board, Mark, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Probability of skipping the heuristics and playing at random.
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.4;

/// Why the policy chose a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reason {
    /// Exploration branch: random square, no lookahead.
    Explore,
    /// Completes a computer line.
    Win,
    /// Blocks a human line.
    Block,
    /// Heuristic branch found nothing; random square.
    Fallback,
}

/// A chosen square and the branch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Board index (0-8).
    pub index: usize,
    /// Branch that produced the index.
    pub reason: Reason,
}

/// Invalid policy configuration.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("Exploration rate must be within [0, 1], got {}", _0)]
pub struct PolicyError(#[error(not(source))] pub f64);

/// Two-tier move selection for the computer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentPolicy {
    exploration_rate: f64,
}

impl OpponentPolicy {
    /// Creates a policy with a custom exploration rate.
    pub fn new(exploration_rate: f64) -> Result<Self, PolicyError> {
        if !(0.0..=1.0).contains(&exploration_rate) {
            warn!(exploration_rate, "Rejected exploration rate");
            return Err(PolicyError(exploration_rate));
        }
        Ok(Self { exploration_rate })
    }

    /// Policy that always takes the heuristic branch.
    pub fn heuristic_only() -> Self {
        Self {
            exploration_rate: 0.0,
        }
    }

    /// Probability of the exploration branch.
    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Chooses the computer's square, or `None` on a full board.
    #[instrument(skip(self, board, rng), fields(board = %board))]
    pub fn choose_move<R>(&self, board: &Board, rng: &mut R) -> Option<usize>
    where
        R: RandomSource + ?Sized,
    {
        self.decide(board, rng).map(|choice| choice.index)
    }

    /// Chooses the computer's square and reports which branch produced it.
    #[instrument(skip(self, board, rng), fields(board = %board))]
    pub fn decide<R>(&self, board: &Board, rng: &mut R) -> Option<Choice>
    where
        R: RandomSource + ?Sized,
    {
        let open = board.empty_indices();
        if open.is_empty() {
            warn!("Opponent asked to move on a full board");
            return None;
        }

        let choice = if rng.chance(self.exploration_rate) {
            Choice {
                index: open[rng.pick(open.len())],
                reason: Reason::Explore,
            }
        } else if let Some(index) = completing_square(board, Mark::Computer) {
            Choice {
                index,
                reason: Reason::Win,
            }
        } else if let Some(index) = completing_square(board, Mark::Human) {
            Choice {
                index,
                reason: Reason::Block,
            }
        } else {
            Choice {
                index: open[rng.pick(open.len())],
                reason: Reason::Fallback,
            }
        };

        debug!(index = choice.index, reason = %choice.reason, "Opponent chose square");
        Some(choice)
    }
}

impl Default for OpponentPolicy {
    fn default() -> Self {
        Self {
            exploration_rate: DEFAULT_EXPLORATION_RATE,
        }
    }
}

/// Chooses the computer's square with the default policy.
pub fn choose_move<R>(board: &Board, rng: &mut R) -> Option<usize>
where
    R: RandomSource + ?Sized,
{
    OpponentPolicy::default().choose_move(board, rng)
}

/// Finds the empty square that would complete a line for `mark`.
///
/// Lines are scanned in declaration order; the first line holding two of
/// `mark` and one empty square wins.
pub fn completing_square(board: &Board, mark: Mark) -> Option<usize> {
    WINNING_LINES.iter().find_map(|line| {
        let owned = line
            .iter()
            .filter(|&&i| board.get(i) == Some(Square::Occupied(mark)))
            .count();
        let empty: Vec<usize> = line.iter().copied().filter(|&i| board.is_empty(i)).collect();
        (owned == 2 && empty.len() == 1).then(|| empty[0])
    })
}
