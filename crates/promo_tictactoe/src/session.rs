//! Single-player game session and its controller.
//!
//! A [`Session`] is a plain value owned by the caller. The
//! [`GameController`] never keeps one between calls: every operation takes a
//! session by reference and returns the next one inside a [`Step`].
//!
//! ```text
//! Active(human) --human move--> Active(computer) --computer move--> Active(human)
//! Active --line completed--> WonByHuman | WonByComputer
//! Active --board full--> Draw
//! any --reset--> Active(human), empty board
//! ```

use crate::opponent::{Choice, OpponentPolicy, RandomSource};
use crate::reward::{NoReward, RewardIssuer, RewardToken};
use crate::rules::{check_move, status_of};
use crate::{Board, GameStatus, Mark, MoveError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Complete state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    board: Board,
    status: GameStatus,
    awaiting: Mark,
    last_move: Option<usize>,
    reward: Option<RewardToken>,
}

impl Session {
    /// Initial session: empty board, human to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            status: GameStatus::Active,
            awaiting: Mark::Human,
            last_move: None,
            reward: None,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Side whose move is pending. Meaningless once the game is over.
    pub fn awaiting(&self) -> Mark {
        self.awaiting
    }

    /// Index of the most recent move.
    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    /// Token issued for a human win, if any.
    pub fn reward(&self) -> Option<&RewardToken> {
        self.reward.as_ref()
    }

    /// True while the game is active and the computer owes a move.
    pub fn is_computers_turn(&self) -> bool {
        self.status == GameStatus::Active && self.awaiting == Mark::Computer
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What a session operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Human moved; the computer must reply.
    AwaitingComputer,
    /// Computer moved; the human is up.
    AwaitingHuman,
    /// Human completed a line.
    HumanWon,
    /// Computer completed a line.
    ComputerWon,
    /// The board filled with no line completed.
    Draw,
    /// Nothing changed.
    Rejected {
        /// Why the move was ignored.
        error: MoveError,
    },
}

impl SessionEvent {
    /// True if the operation left the session untouched.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SessionEvent::Rejected { .. })
    }
}

/// Result of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The next session (equal to the input when rejected).
    pub session: Session,
    /// What happened.
    pub event: SessionEvent,
    /// The opponent's choice, for computer turns that moved.
    pub choice: Option<Choice>,
}

impl Step {
    fn rejected(session: &Session, error: MoveError) -> Self {
        debug!(%error, "Move rejected");
        Self {
            session: session.clone(),
            event: SessionEvent::Rejected { error },
            choice: None,
        }
    }
}

/// Applies moves from both sides to caller-owned sessions.
#[derive(Debug, Clone, Default)]
pub struct GameController<I = NoReward> {
    policy: OpponentPolicy,
    issuer: I,
}

impl<I: RewardIssuer> GameController<I> {
    /// Creates a controller from a policy and a reward issuer.
    pub fn new(policy: OpponentPolicy, issuer: I) -> Self {
        Self { policy, issuer }
    }

    /// Returns the opponent policy.
    pub fn policy(&self) -> &OpponentPolicy {
        &self.policy
    }

    /// Starts a fresh game. Also serves as reset: the old session is simply
    /// dropped by the caller.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Session {
        info!("Starting new session");
        Session::new()
    }

    /// Places the human mark at `index`.
    ///
    /// Ignored (session returned unchanged) when the game is over, the
    /// computer's reply is pending, or the move is illegal.
    #[instrument(skip(self, session), fields(status = %session.status()))]
    pub fn apply_human_move(&self, session: &Session, index: usize) -> Step {
        if session.status.is_terminal() {
            return Step::rejected(session, MoveError::GameOver);
        }
        if session.awaiting != Mark::Human {
            return Step::rejected(session, MoveError::NotHumansTurn);
        }

        let mut next = session.clone();
        if let Err(error) =
            check_move(&next.board, index).and_then(|()| next.board.place(index, Mark::Human))
        {
            return Step::rejected(session, error);
        }
        next.last_move = Some(index);

        let event = self.settle(&mut next, Mark::Human);
        Step {
            session: next,
            event,
            choice: None,
        }
    }

    /// Lets the computer reply.
    ///
    /// Ignored when the game is over or the human has not moved. A policy
    /// that finds no square (full board) also leaves the session unchanged.
    #[instrument(skip(self, session, rng), fields(status = %session.status()))]
    pub fn apply_computer_turn<R>(&self, session: &Session, rng: &mut R) -> Step
    where
        R: RandomSource + ?Sized,
    {
        if session.status.is_terminal() {
            return Step::rejected(session, MoveError::GameOver);
        }
        if session.awaiting != Mark::Computer {
            return Step::rejected(session, MoveError::NotComputersTurn);
        }

        let Some(choice) = self.policy.decide(&session.board, rng) else {
            warn!("Computer turn requested with no empty square");
            return Step::rejected(session, MoveError::NoMoveAvailable);
        };

        let mut next = session.clone();
        if let Err(error) = check_move(&next.board, choice.index)
            .and_then(|()| next.board.place(choice.index, Mark::Computer))
        {
            warn!(%error, index = choice.index, "Opponent proposed an illegal square");
            return Step::rejected(session, error);
        }
        next.last_move = Some(choice.index);

        let event = self.settle(&mut next, Mark::Computer);
        Step {
            session: next,
            event,
            choice: Some(choice),
        }
    }

    /// Evaluates the board after `mover` placed a mark and updates status,
    /// turn, and reward.
    fn settle(&self, next: &mut Session, mover: Mark) -> SessionEvent {
        next.status = status_of(&next.board);
        match next.status {
            GameStatus::WonByHuman => {
                next.reward = self.issuer.issue();
                if next.reward.is_none() {
                    warn!("Human won but no reward token was issued");
                }
                info!(reward = ?next.reward, "Human won");
                SessionEvent::HumanWon
            }
            GameStatus::WonByComputer => {
                info!("Computer won");
                SessionEvent::ComputerWon
            }
            GameStatus::Draw => {
                info!("Game drawn");
                SessionEvent::Draw
            }
            GameStatus::Active => {
                next.awaiting = mover.opponent();
                match next.awaiting {
                    Mark::Computer => SessionEvent::AwaitingComputer,
                    Mark::Human => SessionEvent::AwaitingHuman,
                }
            }
        }
    }
}
