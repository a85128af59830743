//! Move legality.

use crate::{Board, MoveError, Square};
use tracing::instrument;

/// Validates a proposed move, reporting which rule it breaks.
#[instrument]
pub fn check_move(board: &Board, index: usize) -> Result<(), MoveError> {
    match board.get(index) {
        None => Err(MoveError::OutOfBounds(index)),
        Some(Square::Occupied(_)) => Err(MoveError::SquareOccupied(index)),
        Some(Square::Empty) => Ok(()),
    }
}

/// True if `index` is within 0-8 and the square there is empty.
pub fn is_legal(board: &Board, index: usize) -> bool {
    check_move(board, index).is_ok()
}
