//! In-memory store of hosted games.

use promo_tictactoe::{Session, Step};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// Identifier of a hosted game.
pub type GameId = String;

/// A session plus the player it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedGame {
    /// Game state.
    pub session: Session,
    /// Telegram user who started the game, if known.
    pub user_id: Option<i64>,
}

/// Default number of games kept in memory.
pub const DEFAULT_MAX_GAMES: usize = 10_000;

#[derive(Debug)]
struct Entry {
    game: HostedGame,
    touched: u64,
}

#[derive(Debug, Default)]
struct Table {
    games: HashMap<GameId, Entry>,
    clock: u64,
}

impl Table {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, id: &str) -> Option<&mut HostedGame> {
        let now = self.tick();
        let entry = self.games.get_mut(id)?;
        entry.touched = now;
        Some(&mut entry.game)
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .games
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            debug!(game_id = %id, "Evicting least recently used game");
            self.games.remove(&id);
        }
    }
}

/// Shared table of hosted games.
///
/// Holds at most `capacity` games; creating one more evicts the game that
/// was least recently created, read or played. The lock is only held for
/// map access; never across an `.await`.
#[derive(Debug, Clone)]
pub struct SessionManager {
    table: Arc<Mutex<Table>>,
    capacity: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_GAMES)
    }
}

impl SessionManager {
    /// Creates an empty manager with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty manager holding at most `capacity` games (minimum one).
    #[instrument]
    pub fn with_capacity(capacity: usize) -> Self {
        info!("Creating session manager");
        Self {
            table: Arc::new(Mutex::new(Table::default())),
            capacity: capacity.max(1),
        }
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        // A panic mid-update cannot leave a half-written session behind.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a fresh game and returns its id.
    #[instrument(skip(self, session))]
    pub fn create(&self, session: Session, user_id: Option<i64>) -> GameId {
        let mut table = self.table();
        let id = loop {
            let candidate = format!("game_{:016x}", rand::random::<u64>());
            if !table.games.contains_key(&candidate) {
                break candidate;
            }
        };
        while table.games.len() >= self.capacity {
            table.evict_least_recent();
        }
        let touched = table.tick();
        info!(game_id = %id, "Created game");
        table.games.insert(
            id.clone(),
            Entry {
                game: HostedGame { session, user_id },
                touched,
            },
        );
        id
    }

    /// Snapshot of a game.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<HostedGame> {
        let game = self.table().touch(id).map(|game| game.clone());
        if game.is_none() {
            debug!(game_id = id, "Game not found");
        }
        game
    }

    /// Replaces a game's session. Returns false if the game is unknown.
    #[instrument(skip(self, session))]
    pub fn store(&self, id: &str, session: Session) -> bool {
        match self.table().touch(id) {
            Some(game) => {
                game.session = session;
                true
            }
            None => false,
        }
    }

    /// Runs one engine step against a game under the lock and keeps the
    /// resulting session. Returns the step and the game's owner.
    #[instrument(skip(self, step))]
    pub fn apply<F>(&self, id: &str, step: F) -> Option<(Step, Option<i64>)>
    where
        F: FnOnce(&Session) -> Step,
    {
        let mut table = self.table();
        let game = table.touch(id)?;
        let step = step(&game.session);
        debug!(game_id = id, event = ?step.event, "Applied step");
        game.session = step.session.clone();
        Some((step, game.user_id))
    }

    /// Maximum number of hosted games.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of hosted games.
    pub fn len(&self) -> usize {
        self.table().games.len()
    }

    /// Whether no games are hosted.
    pub fn is_empty(&self) -> bool {
        self.table().games.is_empty()
    }
}
