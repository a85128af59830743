//! Draw detection logic for tic-tac-toe.

use super::win::winner;
use crate::{Board, GameStatus, Mark, Square};
use tracing::instrument;

/// Checks if the board is full (no empty square).
#[instrument]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// Derives the game status from a board alone.
///
/// A completed line takes precedence over a full board.
#[instrument]
pub fn status_of(board: &Board) -> GameStatus {
    match winner(board) {
        Some(Mark::Human) => GameStatus::WonByHuman,
        Some(Mark::Computer) => GameStatus::WonByComputer,
        None if is_full(board) => GameStatus::Draw,
        None => GameStatus::Active,
    }
}
