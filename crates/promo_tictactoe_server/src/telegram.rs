//! Minimal Telegram Bot API surface: inbound updates and `sendMessage`.

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Inbound webhook update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Update identifier.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
}

/// Incoming chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    pub message_id: i64,
    /// Sender, absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Conversation the message belongs to.
    pub chat: Chat,
    /// Text body.
    #[serde(default)]
    pub text: Option<String>,
}

/// Telegram user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Username without the leading `@`.
    #[serde(default)]
    pub username: Option<String>,
}

/// Telegram chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,
    /// Chat type (`private`, `group`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Outbound `sendMessage` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Target chat.
    pub chat_id: i64,
    /// Message text.
    pub text: String,
    /// Optional inline keyboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendMessage {
    /// Plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
        }
    }

    /// Attaches a single button that opens a web app.
    pub fn with_web_app_button(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.reply_markup = Some(InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: label.into(),
                web_app: Some(WebAppInfo { url: url.into() }),
            }]],
        });
        self
    }
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Button label.
    pub text: String,
    /// Web app opened by the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

/// Web app launch target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAppInfo {
    /// HTTPS URL of the web app.
    pub url: String,
}

/// Bot API response envelope.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Something that can deliver a chat message.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Sends one message.
    async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError>;
}

/// Bot API client over HTTPS.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// Creates a client for the given API base and bot token.
    #[instrument(skip(token))]
    pub fn new(api_base: &str, token: String) -> Self {
        info!("Creating Telegram client");
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
    async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        debug!("Sending message to Telegram");
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Telegram request failed");
                TelegramError::new(format!("Telegram request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Telegram response");
            TelegramError::new(format!("Failed to read response: {}", e))
        })?;

        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("Message delivered");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => {
                let description = description.unwrap_or_else(|| body.clone());
                error!(status = %status, description = %description, "Telegram API error");
                Err(TelegramError::new(format!(
                    "Telegram API error {}: {}",
                    status, description
                )))
            }
            None => {
                error!(status = %status, response = %body, "Unreadable Telegram response");
                Err(TelegramError::new(format!(
                    "Telegram API error {}: {}",
                    status, body
                )))
            }
        }
    }
}

/// Telegram delivery error.
#[derive(Debug, Clone, Display, Error)]
#[display("Telegram error: {} at {}:{}", message, file, line)]
pub struct TelegramError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TelegramError {
    /// Creates a new Telegram error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
