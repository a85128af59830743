//! Tests for the notify and bot webhook endpoints.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use promo_tictactoe_server::{
    AppState, ChatSender, Notification, NotificationRelay, Outcome, PLAY_BUTTON_LABEL,
    SendMessage, ServerConfig, TelegramError, WELCOME_TEXT, router,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<SendMessage>>,
    fail: bool,
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(TelegramError::new("Bad Request: chat not found".to_string()));
        }
        Ok(())
    }
}

impl RecordingSender {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn messages(&self) -> Vec<SendMessage> {
        self.sent.lock().unwrap().clone()
    }

    async fn wait_for_count(&self, count: usize) -> Vec<SendMessage> {
        for _ in 0..100 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.messages()
    }
}

fn build_app(config: ServerConfig, sender: Option<Arc<RecordingSender>>) -> Router {
    let sender = sender.map(|s| s as Arc<dyn ChatSender>);
    router(AppState::with_sender(config, sender).unwrap())
}

async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn start_update(chat_id: i64, text: &str) -> String {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "from": {"id": chat_id, "is_bot": false, "first_name": "Ann"},
            "chat": {"id": chat_id, "type": "private"},
            "date": 1700000000,
            "text": text
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_notify_queues_message_for_user() {
    let sender = Arc::new(RecordingSender::default());
    let app = build_app(ServerConfig::default(), Some(sender.clone()));

    let (status, body) = post_raw(
        &app,
        "/api/notify",
        r#"{"userId": 77, "status": "win", "promoCode": "A7K3D"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Notification queued"}));

    let sent = sender.wait_for_count(1).await;
    assert_eq!(sent, vec![SendMessage::text(77, "Победа! Промокод выдан: A7K3D")]);
}

#[tokio::test]
async fn test_notify_falls_back_to_configured_chat() {
    let sender = Arc::new(RecordingSender::default());
    let config = ServerConfig::default().with_telegram(Some("123:abc".into()), Some(-100));
    let app = build_app(config, Some(sender.clone()));

    let (_, body) = post_raw(&app, "/api/notify", r#"{"status": "lose"}"#).await;
    assert_eq!(body["message"], "Notification queued");

    let sent = sender.wait_for_count(1).await;
    assert_eq!(sent, vec![SendMessage::text(-100, "Проигрыш")]);
}

#[tokio::test]
async fn test_notify_never_fails_the_caller() {
    let sender = Arc::new(RecordingSender::default());
    let app_with_bot = build_app(ServerConfig::default(), Some(sender.clone()));

    let (status, body) = post_raw(&app_with_bot, "/api/notify", r#"{"status": "draw"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Invalid status, but continuing");

    let (status, body) = post_raw(&app_with_bot, "/api/notify", "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request error, but continuing");

    // No user id and no default chat.
    let (_, body) = post_raw(&app_with_bot, "/api/notify", r#"{"status": "lose"}"#).await;
    assert_eq!(body["message"], "Telegram not configured");

    let no_bot = build_app(ServerConfig::default(), None);
    let (status, body) = post_raw(&no_bot, "/api/notify", r#"{"userId": 1, "status": "win"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Telegram not configured"}));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(sender.messages().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_is_swallowed() {
    let sender = Arc::new(RecordingSender::failing());
    let relay = NotificationRelay::new(Some(sender.clone() as Arc<dyn ChatSender>), None);

    let handle = relay
        .dispatch(Notification::new(Some(3), Outcome::Win, None))
        .expect("queued");
    handle.await.expect("delivery task does not panic");
    assert_eq!(sender.messages(), vec![SendMessage::text(3, "Победа!")]);
}

#[tokio::test]
async fn test_start_replies_with_app_button() {
    let sender = Arc::new(RecordingSender::default());
    let config = ServerConfig::default().with_app_url(Some("https://game.test".into()));
    let app = build_app(config, Some(sender.clone()));

    let (status, body) = post_raw(&app, "/api/telegram", &start_update(42, "/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let sent = sender.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        SendMessage::text(42, WELCOME_TEXT).with_web_app_button(PLAY_BUTTON_LABEL, "https://game.test")
    );
}

#[tokio::test]
async fn test_start_without_app_url_sends_plain_welcome() {
    let sender = Arc::new(RecordingSender::default());
    let app = build_app(ServerConfig::default(), Some(sender.clone()));

    post_raw(&app, "/api/telegram", &start_update(42, "/start")).await;
    assert_eq!(sender.messages(), vec![SendMessage::text(42, WELCOME_TEXT)]);
}

#[tokio::test]
async fn test_webhook_always_acknowledges() {
    let sender = Arc::new(RecordingSender::failing());
    let app_with_bot = build_app(ServerConfig::default(), Some(sender.clone()));

    // Other text is only logged.
    let (status, body) = post_raw(&app_with_bot, "/api/telegram", &start_update(5, "hello")).await;
    assert_eq!((status, body), (StatusCode::OK, json!({"ok": true})));
    assert!(sender.messages().is_empty());

    // Send failures are swallowed.
    let (status, body) = post_raw(&app_with_bot, "/api/telegram", &start_update(5, "/start")).await;
    assert_eq!((status, body), (StatusCode::OK, json!({"ok": true})));
    assert_eq!(sender.messages().len(), 1);

    let (status, body) = post_raw(&app_with_bot, "/api/telegram", "not json").await;
    assert_eq!((status, body), (StatusCode::OK, json!({"ok": true})));

    let no_bot = build_app(ServerConfig::default(), None);
    let (status, body) = post_raw(&no_bot, "/api/telegram", &start_update(5, "/start")).await;
    assert_eq!((status, body), (StatusCode::OK, json!({"ok": true})));
}
