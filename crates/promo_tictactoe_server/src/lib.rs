//! Mini-app host for promo tic-tac-toe.
//!
//! # Architecture
//!
//! - **Routes**: JSON game API over [`promo_tictactoe`] sessions, plus the
//!   promo-code, notify, and bot webhook endpoints
//! - **Sessions**: in-memory [`SessionManager`] keyed by game id
//! - **Notifications**: [`NotificationRelay`] sends outcome messages through
//!   the bot without ever blocking a game
//! - **Config**: [`ServerConfig`] layered from defaults, TOML, environment,
//!   and CLI flags
//!
//! # Example
//!
//! ```no_run
//! use promo_tictactoe_server::{AppState, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load(None)?;
//! let app = router(AppState::from_config(config)?);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod error;
mod notify;
mod routes;
mod sessions;
mod telegram;
pub mod terminal;
mod webhook;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use notify::{Notification, NotificationRelay, Outcome, message_text};
pub use routes::{
    AppState, CreateGameRequest, GameView, MoveRequest, MoveResponse, NotifyRequest,
    NotifyResponse, PromoCodeResponse, router,
};
pub use sessions::{DEFAULT_MAX_GAMES, GameId, HostedGame, SessionManager};
pub use telegram::{
    Chat, ChatSender, InlineKeyboardButton, InlineKeyboardMarkup, Message, SendMessage,
    TelegramClient, TelegramError, Update, User, WebAppInfo,
};
pub use webhook::{PLAY_BUTTON_LABEL, WELCOME_TEXT, handle_update, welcome_message};
