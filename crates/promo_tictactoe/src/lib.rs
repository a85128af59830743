//! Tic-tac-toe engine for a single human against a beatable computer.
//!
//! # Architecture
//!
//! - **Board model**: [`Board`], [`Square`], [`Mark`], and the eight
//!   [`WINNING_LINES`]
//! - **Rules**: [`winner`], [`is_full`], [`is_legal`]
//! - **Opponent**: [`OpponentPolicy`], a random/heuristic mix that wins or
//!   blocks opportunistically
//! - **Session**: [`GameController`] applies moves to caller-owned
//!   [`Session`] values
//!
//! The engine does no I/O and keeps no state between calls.
//!
//! # Example
//!
//! ```
//! use promo_tictactoe::{GameController, OpponentPolicy, PromoCodeIssuer, SessionEvent};
//!
//! let controller = GameController::new(OpponentPolicy::default(), PromoCodeIssuer);
//! let session = controller.reset();
//!
//! let step = controller.apply_human_move(&session, 4);
//! assert_eq!(step.event, SessionEvent::AwaitingComputer);
//!
//! let step = controller.apply_computer_turn(&step.session, &mut rand::rng());
//! assert_eq!(step.event, SessionEvent::AwaitingHuman);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod opponent;
mod reward;
pub mod rules;
mod session;
mod types;

pub use action::MoveError;
pub use opponent::{
    Choice, DEFAULT_EXPLORATION_RATE, OpponentPolicy, PolicyError, RandomSource, Reason,
    ScriptedSource, choose_move, completing_square,
};
pub use reward::{
    NoReward, PROMO_ALPHABET, PROMO_CODE_LEN, PromoCodeIssuer, RewardIssuer, RewardToken,
};
pub use rules::{WINNING_LINES, check_move, is_full, is_legal, status_of, winner};
pub use session::{GameController, Session, SessionEvent, Step};
pub use types::{BOARD_SIZE, Board, BoardParseError, GameStatus, Mark, Square, empty_board};
