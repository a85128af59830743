//! Bot webhook handling.

use crate::telegram::{ChatSender, SendMessage, Update};
use tracing::{debug, error, info, instrument, warn};

/// Greeting sent in reply to `/start`.
pub const WELCOME_TEXT: &str = "Добро пожаловать в игру Tic-Tac-Toe! 🎮\n\nИграйте в крестики-нолики и получайте промокоды за победы!";

/// Label of the button that opens the mini-app.
pub const PLAY_BUTTON_LABEL: &str = "Играть в игру";

/// Builds the `/start` reply, with a launch button when the app URL is known.
pub fn welcome_message(chat_id: i64, app_url: Option<&str>) -> SendMessage {
    let message = SendMessage::text(chat_id, WELCOME_TEXT);
    match app_url {
        Some(url) => message.with_web_app_button(PLAY_BUTTON_LABEL, url),
        None => message,
    }
}

/// Handles one inbound update. Failures are logged, never returned.
#[instrument(skip_all, fields(update_id = update.update_id))]
pub async fn handle_update(update: &Update, sender: Option<&dyn ChatSender>, app_url: Option<&str>) {
    let Some(sender) = sender else {
        error!("TELEGRAM_BOT_TOKEN is not configured");
        return;
    };
    let Some(message) = &update.message else {
        debug!("Update without message");
        return;
    };

    let chat_id = message.chat.id;
    match message.text.as_deref() {
        Some("/start") => {
            if app_url.is_none() {
                warn!("App URL is not configured, sending welcome without button");
            }
            let reply = welcome_message(chat_id, app_url);
            match sender.send_message(&reply).await {
                Ok(()) => info!(chat_id, "Sent /start reply"),
                Err(e) => error!(error = %e, "Failed to send /start reply"),
            }
        }
        Some(text) => info!(chat_id, text, "Received text message"),
        None => debug!(chat_id, "Message without text"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_without_url_has_no_button() {
        let message = welcome_message(9, None);
        assert_eq!(message.chat_id, 9);
        assert_eq!(message.text, WELCOME_TEXT);
        assert!(message.reply_markup.is_none());
    }

    #[test]
    fn test_welcome_with_url_opens_app() {
        let message = welcome_message(9, Some("https://game.test"));
        let markup = message.reply_markup.expect("button attached");
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, PLAY_BUTTON_LABEL);
        assert_eq!(
            button.web_app.as_ref().map(|app| app.url.as_str()),
            Some("https://game.test")
        );
    }
}
