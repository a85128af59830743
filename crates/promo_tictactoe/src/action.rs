//! Move rejection reasons.
//!
//! Rejections are values, not failures: the session controller returns the
//! session untouched together with one of these.

use serde::{Deserialize, Serialize};

/// Reason a move could not be applied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
    derive_more::Error,
)]
#[serde(tag = "reason", content = "index", rename_all = "snake_case")]
pub enum MoveError {
    /// The index lies outside 0-8.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(#[error(not(source))] usize),

    /// The square at the index is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(#[error(not(source))] usize),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The computer has not replied yet.
    #[display("Waiting for the computer to move")]
    NotHumansTurn,

    /// The human has not moved yet.
    #[display("Waiting for the human to move")]
    NotComputersTurn,

    /// The opponent policy found no empty square.
    #[display("No move available on a full board")]
    NoMoveAvailable,
}
