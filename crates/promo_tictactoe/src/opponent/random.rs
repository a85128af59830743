//! Randomness behind the opponent policy.

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};
use std::collections::VecDeque;

/// Uniform random source consumed by the opponent policy.
///
/// Implemented for `rand`'s generators and for [`ScriptedSource`], which
/// replays a fixed sequence so either policy branch can be forced.
pub trait RandomSource {
    /// Returns true with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool;

    /// Picks an index uniformly from `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn chance(&mut self, p: f64) -> bool {
        self.random_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

impl RandomSource for ThreadRng {
    fn chance(&mut self, p: f64) -> bool {
        self.random_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Deterministic source replaying scripted draws.
///
/// `chance(p)` consumes the next roll and succeeds when it is below `p`,
/// mirroring a uniform draw from `[0, 1)`. `pick(len)` consumes the next
/// pick modulo `len`. Exhausted scripts fall back to `1.0` (never taken)
/// and `0` (first candidate).
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    rolls: VecDeque<f64>,
    picks: VecDeque<usize>,
}

impl ScriptedSource {
    /// Creates a source from roll and pick sequences.
    pub fn new(
        rolls: impl IntoIterator<Item = f64>,
        picks: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            picks: picks.into_iter().collect(),
        }
    }

    /// A source whose rolls never take the exploration branch.
    pub fn never_explore() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedSource {
    fn chance(&mut self, p: f64) -> bool {
        self.rolls.pop_front().unwrap_or(1.0) < p
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}
