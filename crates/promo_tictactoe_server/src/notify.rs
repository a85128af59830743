//! Outcome notifications delivered through the bot.
//!
//! Delivery never blocks or fails the game: sends run on a spawned task and
//! every failure ends as a log line.

use crate::telegram::{ChatSender, SendMessage};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Game outcome reported to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// The player beat the computer.
    Win,
    /// The computer beat the player.
    Lose,
}

/// Text sent for an outcome.
pub fn message_text(outcome: Outcome, promo_code: Option<&str>) -> String {
    match (outcome, promo_code) {
        (Outcome::Win, Some(code)) => format!("Победа! Промокод выдан: {}", code),
        (Outcome::Win, None) => "Победа!".to_string(),
        (Outcome::Lose, _) => "Проигрыш".to_string(),
    }
}

/// A pending outcome notification.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Notification {
    /// Player's chat, when known.
    pub recipient: Option<i64>,
    /// What happened.
    pub outcome: Outcome,
    /// Promo code awarded on a win.
    pub promo_code: Option<String>,
}

/// Fire-and-forget dispatcher for outcome notifications.
#[derive(Clone)]
pub struct NotificationRelay {
    sender: Option<Arc<dyn ChatSender>>,
    default_chat_id: Option<i64>,
}

impl std::fmt::Debug for NotificationRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRelay")
            .field("configured", &self.sender.is_some())
            .field("default_chat_id", &self.default_chat_id)
            .finish()
    }
}

impl NotificationRelay {
    /// Creates a relay. Without a sender every notification is dropped.
    pub fn new(sender: Option<Arc<dyn ChatSender>>, default_chat_id: Option<i64>) -> Self {
        Self {
            sender,
            default_chat_id,
        }
    }

    /// Relay that drops everything.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Whether a bot is available to send through.
    pub fn is_configured(&self) -> bool {
        self.sender.is_some()
    }

    /// Chat a notification would go to.
    pub fn recipient_for(&self, notification: &Notification) -> Option<i64> {
        notification.recipient.or(self.default_chat_id)
    }

    /// Queues a notification and returns without waiting for delivery.
    ///
    /// Returns the delivery task, or `None` when nothing was queued.
    #[instrument(skip(self), fields(outcome = %notification.outcome))]
    pub fn dispatch(&self, notification: Notification) -> Option<JoinHandle<()>> {
        let Some(sender) = self.sender.clone() else {
            warn!("Telegram not configured, dropping notification");
            return None;
        };
        let Some(chat_id) = self.recipient_for(&notification) else {
            warn!("No recipient for notification, dropping it");
            return None;
        };
        if notification.outcome == Outcome::Win && notification.promo_code.is_none() {
            warn!("Win notification without promo code");
        }

        let message = SendMessage::text(
            chat_id,
            message_text(notification.outcome, notification.promo_code.as_deref()),
        );
        debug!(chat_id, "Queueing notification");
        Some(tokio::spawn(async move {
            match sender.send_message(&message).await {
                Ok(()) => info!(chat_id, "Notification sent"),
                Err(e) => warn!(error = %e, "Notification failed, continuing"),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_texts() {
        assert_eq!(
            message_text(Outcome::Win, Some("A7K3D")),
            "Победа! Промокод выдан: A7K3D"
        );
        assert_eq!(message_text(Outcome::Win, None), "Победа!");
        assert_eq!(message_text(Outcome::Lose, Some("IGNORED")), "Проигрыш");
    }

    #[test]
    fn test_outcome_parses_lowercase() {
        assert_eq!("win".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!("lose".parse::<Outcome>().unwrap(), Outcome::Lose);
        assert!("draw".parse::<Outcome>().is_err());
        assert_eq!(Outcome::Lose.to_string(), "lose");
    }

    #[test]
    fn test_recipient_falls_back_to_default_chat() {
        let relay = NotificationRelay::new(None, Some(-100));
        let known = Notification::new(Some(5), Outcome::Lose, None);
        let unknown = Notification::new(None, Outcome::Lose, None);
        assert_eq!(relay.recipient_for(&known), Some(5));
        assert_eq!(relay.recipient_for(&unknown), Some(-100));
        assert_eq!(NotificationRelay::disabled().recipient_for(&unknown), None);
    }

    #[tokio::test]
    async fn test_disabled_relay_queues_nothing() {
        let relay = NotificationRelay::disabled();
        assert!(!relay.is_configured());
        assert!(relay.dispatch(Notification::new(Some(1), Outcome::Win, None)).is_none());
    }
}
