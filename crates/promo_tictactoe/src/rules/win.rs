//! Win detection logic for tic-tac-toe.

use super::lines::WINNING_LINES;
use crate::{Board, Mark, Square};
use tracing::instrument;

/// Checks if there is a winner on the board.
///
/// Returns the mark of the first line (in [`WINNING_LINES`] order) whose
/// three squares hold the same mark, `None` otherwise. Total over any
/// snapshot, including ones no legal game reaches.
#[instrument]
pub fn winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in WINNING_LINES {
        let sq = board.get(a);
        if let Some(Square::Occupied(mark)) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Some(mark);
        }
    }

    None
}
