//! HTTP surface of the mini-app host.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/games` | start a game |
//! | `GET /api/games/{id}` | read a game |
//! | `POST /api/games/{id}/moves` | human move, then the computer's reply |
//! | `POST /api/games/{id}/reset` | fresh board under the same id |
//! | `GET /api/promo-code` | one promo code |
//! | `POST /api/notify` | outcome notification from the client |
//! | `POST /api/telegram` | bot webhook |

use crate::config::{ConfigError, ServerConfig};
use crate::error::ApiError;
use crate::notify::{Notification, NotificationRelay, Outcome};
use crate::sessions::{GameId, SessionManager};
use crate::telegram::{ChatSender, TelegramClient, Update};
use crate::webhook::handle_update;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use promo_tictactoe::{
    BOARD_SIZE, Choice, GameController, GameStatus, Mark, MoveError, PromoCodeIssuer, Session,
    SessionEvent, Step,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionManager,
    controller: Arc<GameController<PromoCodeIssuer>>,
    relay: NotificationRelay,
    telegram: Option<Arc<dyn ChatSender>>,
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Builds state, creating a Bot API client when a token is configured.
    pub fn from_config(config: ServerConfig) -> Result<Self, ConfigError> {
        let telegram = config.telegram_bot_token().clone().map(|token| {
            Arc::new(TelegramClient::new(config.telegram_api_base(), token)) as Arc<dyn ChatSender>
        });
        Self::with_sender(config, telegram)
    }

    /// Builds state around an explicit chat sender.
    pub fn with_sender(
        config: ServerConfig,
        telegram: Option<Arc<dyn ChatSender>>,
    ) -> Result<Self, ConfigError> {
        let controller = GameController::new(config.policy()?, PromoCodeIssuer);
        let relay = NotificationRelay::new(telegram.clone(), *config.telegram_chat_id());
        Ok(Self {
            sessions: SessionManager::with_capacity(*config.max_games()),
            controller: Arc::new(controller),
            relay,
            telegram,
            config: Arc::new(config),
        })
    }

    /// Hosted games.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", post(create_game))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/moves", post(make_move))
        .route("/api/games/{id}/reset", post(reset_game))
        .route("/api/promo-code", get(promo_code))
        .route("/api/notify", post(notify))
        .route("/api/telegram", post(telegram_webhook))
        .with_state(state)
}

/// Client-facing snapshot of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Game id.
    pub id: GameId,
    /// `null`, `"X"` (human) or `"O"` (computer) per square.
    pub cells: [Option<char>; BOARD_SIZE],
    /// Game status.
    pub status: GameStatus,
    /// Whose move it is.
    pub awaiting: Mark,
    /// Most recently filled square.
    pub last_move: Option<usize>,
    /// Promo code, present once the human has won.
    pub promo_code: Option<String>,
}

impl GameView {
    /// Renders a session.
    pub fn new(id: &str, session: &Session) -> Self {
        let squares = *session.board().squares();
        Self {
            id: id.to_string(),
            cells: squares.map(|square| square.mark().map(Mark::symbol)),
            status: session.status(),
            awaiting: session.awaiting(),
            last_move: session.last_move(),
            promo_code: session.reward().map(ToString::to_string),
        }
    }
}

/// Body of `POST /api/games`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGameRequest {
    /// Telegram user starting the game.
    pub user_id: Option<i64>,
}

/// Body of `POST /api/games/{id}/moves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Square to mark, 0..=8 row-major.
    pub index: i64,
}

/// Result of a move request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Game after the move and the computer's reply.
    pub game: GameView,
    /// Events in the order they happened.
    pub events: Vec<SessionEvent>,
    /// The computer's move, if it made one.
    pub computer: Option<Choice>,
    /// Why the human move was refused.
    pub error: Option<MoveError>,
}

/// Body of `GET /api/promo-code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeResponse {
    /// Freshly generated code.
    pub promo_code: String,
}

/// Body of `POST /api/notify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyRequest {
    /// Telegram user to notify.
    pub user_id: Option<i64>,
    /// `win` or `lose`.
    pub status: Option<String>,
    /// Code awarded on a win.
    pub promo_code: Option<String>,
}

/// Reply of `POST /api/notify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResponse {
    /// Always true; notification problems never surface to the game.
    pub success: bool,
    /// What happened to the notification.
    pub message: String,
}

impl NotifyResponse {
    fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

fn outcome_of(event: SessionEvent) -> Option<Outcome> {
    match event {
        SessionEvent::HumanWon => Some(Outcome::Win),
        SessionEvent::ComputerWon => Some(Outcome::Lose),
        _ => None,
    }
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> (StatusCode, Json<GameView>) {
    let session = state.controller.reset();
    let id = state.sessions.create(session.clone(), request.user_id);
    (StatusCode::CREATED, Json(GameView::new(&id, &session)))
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<Json<GameView>, ApiError> {
    let game = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(GameView::new(&id, &game.session)))
}

#[instrument(skip(state))]
async fn reset_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<Json<GameView>, ApiError> {
    let session = state.controller.reset();
    if !state.sessions.store(&id, session.clone()) {
        return Err(ApiError::GameNotFound(id));
    }
    info!(game_id = %id, "Game reset");
    Ok(Json(GameView::new(&id, &session)))
}

/// Assembles the reply to a move from the human step and, when the human
/// move was accepted, the computer's step.
fn move_response(id: &str, human: Step, reply: Option<Step>) -> MoveResponse {
    let mut events = vec![human.event];
    let last = match reply {
        Some(reply) => {
            events.push(reply.event);
            reply
        }
        None => human,
    };
    let error = events.iter().find_map(|event| match event {
        SessionEvent::Rejected { error } => Some(*error),
        _ => None,
    });
    MoveResponse {
        game: GameView::new(id, &last.session),
        events,
        computer: last.choice,
        error,
    }
}

#[instrument(skip(state))]
async fn make_move(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    // Negative indices are out of range too.
    let index = usize::try_from(request.index).unwrap_or(usize::MAX);
    let controller = &state.controller;

    let (human, user_id) = state
        .sessions
        .apply(&id, |session| controller.apply_human_move(session, index))
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    if let SessionEvent::Rejected { error } = human.event {
        warn!(game_id = %id, index = request.index, error = %error, "Move rejected");
        return Ok(Json(move_response(&id, human, None)));
    }

    // Both halves of the turn are stored before the first await, so a
    // dropped request never leaves the game waiting on the computer.
    let reply = if human.event == SessionEvent::AwaitingComputer {
        let (reply, _) = state
            .sessions
            .apply(&id, |session| {
                controller.apply_computer_turn(session, &mut rand::rng())
            })
            .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
        debug!(game_id = %id, choice = ?reply.choice, "Computer replied");
        Some(reply)
    } else {
        None
    };
    let computer_moved = reply.is_some();

    let response = move_response(&id, human, reply);
    if let Some(error) = response.error {
        warn!(game_id = %id, error = %error, "Computer turn rejected");
    }

    if let Some(outcome) = response.events.last().copied().and_then(outcome_of) {
        info!(game_id = %id, outcome = %outcome, "Game finished");
        state.relay.dispatch(Notification::new(
            user_id,
            outcome,
            response.game.promo_code.clone(),
        ));
    }

    if computer_moved {
        tokio::time::sleep(state.config.computer_delay()).await;
    }
    Ok(Json(response))
}

#[instrument]
async fn promo_code() -> Json<PromoCodeResponse> {
    let code = PromoCodeIssuer::generate(&mut rand::rng());
    debug!(code = %code, "Generated promo code");
    Json(PromoCodeResponse {
        promo_code: code.to_string(),
    })
}

#[instrument(skip(state, body))]
async fn notify(State(state): State<AppState>, body: Bytes) -> Json<NotifyResponse> {
    let request: NotifyRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unreadable notification request");
            return Json(NotifyResponse::new("Request error, but continuing"));
        }
    };

    let outcome = match request.status.as_deref().map(str::parse::<Outcome>) {
        Some(Ok(outcome)) => outcome,
        _ => {
            warn!(status = ?request.status, "Invalid status in notification request");
            return Json(NotifyResponse::new("Invalid status, but continuing"));
        }
    };

    let notification = Notification::new(request.user_id, outcome, request.promo_code);
    if !state.relay.is_configured() || state.relay.recipient_for(&notification).is_none() {
        warn!("Telegram credentials not configured");
        return Json(NotifyResponse::new("Telegram not configured"));
    }

    state.relay.dispatch(notification);
    Json(NotifyResponse::new("Notification queued"))
}

#[instrument(skip(state, body))]
async fn telegram_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<serde_json::Value> {
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            debug!(update_id = update.update_id, "Received Telegram update");
            handle_update(
                &update,
                state.telegram.as_deref(),
                state.config.app_url().as_deref(),
            )
            .await;
        }
        Err(e) => warn!(error = %e, "Unreadable Telegram update"),
    }
    Json(serde_json::json!({ "ok": true }))
}
