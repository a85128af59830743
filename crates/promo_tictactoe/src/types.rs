//! Core domain types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of squares on the board.
pub const BOARD_SIZE: usize = 9;

/// Mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// The human player (rendered as X, moves first).
    Human,
    /// The computer opponent (rendered as O).
    Computer,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::Human => Mark::Computer,
            Mark::Computer => Mark::Human,
        }
    }

    /// Single-character symbol for this mark.
    pub fn symbol(self) -> char {
        match self {
            Mark::Human => 'X',
            Mark::Computer => 'O',
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

impl Square {
    /// Returns the mark on this square, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

/// 3x3 tic-tac-toe board.
///
/// Squares are stored in row-major order:
///
/// ```text
/// 0 1 2
/// 3 4 5
/// 6 7 8
/// ```
///
/// The only mutation is [`Board::place`], which refuses occupied squares,
/// so a mark once written stays until the board is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [Square; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; BOARD_SIZE],
        }
    }

    /// Wraps an arbitrary snapshot. No consistency checks are made, so
    /// boards no legal game can reach are representable.
    pub fn from_squares(squares: [Square; BOARD_SIZE]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given index (0-8).
    pub fn get(&self, index: usize) -> Option<Square> {
        self.squares.get(index).copied()
    }

    /// Checks if the square at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Square::Empty))
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; BOARD_SIZE] {
        &self.squares
    }

    /// Indices of every empty square, ascending.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, square)| **square == Square::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of squares holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .filter(|square| **square == Square::Occupied(mark))
            .count()
    }

    /// Writes `mark` at `index`.
    ///
    /// Fails without touching the board if the index is outside 0-8 or the
    /// square is already occupied.
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), crate::MoveError> {
        match self.squares.get_mut(index) {
            None => Err(crate::MoveError::OutOfBounds(index)),
            Some(Square::Occupied(_)) => Err(crate::MoveError::SquareOccupied(index)),
            Some(square) => {
                *square = Square::Occupied(mark);
                Ok(())
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a board with every square empty.
pub fn empty_board() -> Board {
    Board::new()
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, square) in self.squares.iter().enumerate() {
            let symbol = square.mark().map_or('.', Mark::symbol);
            write!(f, "{}", symbol)?;
            if index % 3 == 2 && index < BOARD_SIZE - 1 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

/// Error parsing a board from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardParseError {
    /// A character other than `X`, `O`, `.` or a separator was found.
    #[display("Invalid board character {:?} at offset {}", character, offset)]
    InvalidCharacter {
        /// Offending character.
        character: char,
        /// Byte offset in the input.
        offset: usize,
    },
    /// The input did not describe exactly nine squares.
    #[display("Expected 9 squares, found {}", _0)]
    WrongLength(#[error(not(source))] usize),
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses `X`, `O` and `.` (or `_`, `-`) squares in row-major order.
    /// Whitespace, `/`, `|` and `,` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut squares = Vec::with_capacity(BOARD_SIZE);
        for (offset, character) in s.char_indices() {
            let square = match character {
                'X' | 'x' => Square::Occupied(Mark::Human),
                'O' | 'o' => Square::Occupied(Mark::Computer),
                '.' | '_' | '-' => Square::Empty,
                '/' | '|' | ',' => continue,
                c if c.is_whitespace() => continue,
                character => {
                    return Err(BoardParseError::InvalidCharacter { character, offset });
                }
            };
            squares.push(square);
        }

        let squares: [Square; BOARD_SIZE] = squares
            .try_into()
            .map_err(|rejected: Vec<Square>| BoardParseError::WrongLength(rejected.len()))?;
        Ok(Self::from_squares(squares))
    }
}

/// Current status of the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Game is ongoing.
    Active,
    /// The human completed a line.
    WonByHuman,
    /// The computer completed a line.
    WonByComputer,
    /// The board filled with no line completed.
    Draw,
}

impl GameStatus {
    /// True for every status except [`GameStatus::Active`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.empty_indices(), (0..9).collect::<Vec<_>>());
        assert_eq!(board, empty_board());
    }

    #[test]
    fn test_place_refuses_occupied_square() {
        let mut board = Board::new();
        board.place(4, Mark::Human).unwrap();
        assert_eq!(
            board.place(4, Mark::Computer),
            Err(crate::MoveError::SquareOccupied(4))
        );
        assert_eq!(board.get(4), Some(Square::Occupied(Mark::Human)));
    }

    #[test]
    fn test_place_refuses_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(
            board.place(9, Mark::Human),
            Err(crate::MoveError::OutOfBounds(9))
        );
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_parse_and_display() {
        let board: Board = "XX. .O. ...".parse().unwrap();
        assert_eq!(board.get(0), Some(Square::Occupied(Mark::Human)));
        assert_eq!(board.get(4), Some(Square::Occupied(Mark::Computer)));
        assert_eq!(board.to_string(), "XX./.O./...");
        assert_eq!(board.to_string().parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "XXZ......".parse::<Board>(),
            Err(BoardParseError::InvalidCharacter {
                character: 'Z',
                offset: 2
            })
        );
        assert_eq!(
            "XX".parse::<Board>(),
            Err(BoardParseError::WrongLength(2))
        );
    }

    #[test]
    fn test_status_terminal() {
        assert!(!GameStatus::Active.is_terminal());
        assert!(GameStatus::Draw.is_terminal());
        assert_eq!(GameStatus::WonByHuman.to_string(), "won_by_human");
    }
}
