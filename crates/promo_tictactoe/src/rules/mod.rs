//! Game rules for tic-tac-toe.
//!
//! Pure functions over board snapshots. Rules are kept apart from board
//! storage so the session controller and the opponent policy share them.

pub mod draw;
pub mod legal;
pub mod lines;
pub mod win;

pub use draw::{is_full, status_of};
pub use legal::{check_move, is_legal};
pub use lines::{Line, WINNING_LINES};
pub use win::winner;
