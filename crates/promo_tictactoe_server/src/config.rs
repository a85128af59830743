//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, environment variables, then CLI flags.

use crate::sessions::DEFAULT_MAX_GAMES;
use derive_getters::Getters;
use derive_more::{Display, Error};
use promo_tictactoe::{DEFAULT_EXPLORATION_RATE, OpponentPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the mini-app host.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Cosmetic pause before the computer replies, in milliseconds.
    computer_delay_ms: u64,

    /// Probability that the computer plays a random square.
    exploration_rate: f64,

    /// Bot token for the Telegram Bot API.
    telegram_bot_token: Option<String>,

    /// Chat that receives outcome notifications when the player is unknown.
    telegram_chat_id: Option<i64>,

    /// Public URL of the mini-app, used for the `/start` button.
    app_url: Option<String>,

    /// Base URL of the Bot API.
    telegram_api_base: String,

    /// Most games held in memory; the least recently used is evicted.
    max_games: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            computer_delay_ms: 900,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
            telegram_bot_token: None,
            telegram_chat_id: None,
            app_url: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            max_games: DEFAULT_MAX_GAMES,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys keep defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file (if given) and applies process environment overrides.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an environment lookup.
    ///
    /// Recognised keys: `HOST`, `PORT`, `COMPUTER_DELAY_MS`,
    /// `EXPLORATION_RATE`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
    /// `APP_URL` (or `NEXT_PUBLIC_APP_URL`), `TELEGRAM_API_BASE`, `MAX_GAMES`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.host = host;
        }
        if let Some(port) = get("PORT") {
            self.port = parse_var("PORT", &port)?;
        }
        if let Some(delay) = get("COMPUTER_DELAY_MS") {
            self.computer_delay_ms = parse_var("COMPUTER_DELAY_MS", &delay)?;
        }
        if let Some(rate) = get("EXPLORATION_RATE") {
            self.exploration_rate = parse_var("EXPLORATION_RATE", &rate)?;
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = Some(token);
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.telegram_chat_id = Some(parse_var("TELEGRAM_CHAT_ID", &chat_id)?);
        }
        if let Some(url) = get("APP_URL").or_else(|| get("NEXT_PUBLIC_APP_URL")) {
            self.app_url = Some(url);
        }
        if let Some(base) = get("TELEGRAM_API_BASE") {
            self.telegram_api_base = base;
        }
        if let Some(max) = get("MAX_GAMES") {
            self.max_games = parse_var("MAX_GAMES", &max)?;
        }

        self.policy()?;
        Ok(self)
    }

    /// Applies CLI listen-address overrides.
    pub fn with_listen(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Sets the computer delay; tests run with zero.
    pub fn with_computer_delay(mut self, delay: Duration) -> Self {
        self.computer_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the Telegram credentials.
    pub fn with_telegram(mut self, bot_token: Option<String>, chat_id: Option<i64>) -> Self {
        self.telegram_bot_token = bot_token;
        self.telegram_chat_id = chat_id;
        self
    }

    /// Sets the game capacity.
    pub fn with_max_games(mut self, max_games: usize) -> Self {
        self.max_games = max_games;
        self
    }

    /// Sets the mini-app URL.
    pub fn with_app_url(mut self, app_url: Option<String>) -> Self {
        self.app_url = app_url;
        self
    }

    /// Pause before the computer replies.
    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.computer_delay_ms)
    }

    /// Builds the opponent policy from the configured exploration rate.
    pub fn policy(&self) -> Result<OpponentPolicy, ConfigError> {
        OpponentPolicy::new(self.exploration_rate)
            .map_err(|e| ConfigError::new(format!("Invalid exploration_rate: {}", e)))
    }
}

#[track_caller]
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::new(format!("Invalid {}={:?}: {}", key, value, e))),
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port(), &3000);
        assert_eq!(config.computer_delay(), Duration::from_millis(900));
        assert_eq!(config.policy().unwrap().exploration_rate(), 0.4);
        assert!(config.telegram_bot_token().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::default()
            .with_env(env(&[
                ("PORT", "8080"),
                ("TELEGRAM_BOT_TOKEN", "123:abc"),
                ("TELEGRAM_CHAT_ID", "-1001"),
                ("NEXT_PUBLIC_APP_URL", "https://example.test/app"),
                ("COMPUTER_DELAY_MS", "0"),
            ]))
            .unwrap();
        assert_eq!(config.port(), &8080);
        assert_eq!(config.telegram_bot_token().as_deref(), Some("123:abc"));
        assert_eq!(config.telegram_chat_id(), &Some(-1001));
        assert_eq!(config.app_url().as_deref(), Some("https://example.test/app"));
        assert_eq!(config.computer_delay(), Duration::ZERO);
    }

    #[test]
    fn test_app_url_prefers_plain_key() {
        let config = ServerConfig::default()
            .with_env(env(&[
                ("APP_URL", "https://a.test"),
                ("NEXT_PUBLIC_APP_URL", "https://b.test"),
            ]))
            .unwrap();
        assert_eq!(config.app_url().as_deref(), Some("https://a.test"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ServerConfig::default()
            .with_env(env(&[("TELEGRAM_BOT_TOKEN", "  ")]))
            .unwrap();
        assert!(config.telegram_bot_token().is_none());
    }

    #[test]
    fn test_bad_values_are_errors() {
        let err = ServerConfig::default()
            .with_env(env(&[("PORT", "not-a-port")]))
            .unwrap_err();
        assert!(err.message.contains("PORT"));

        let err = ServerConfig::default()
            .with_env(env(&[("EXPLORATION_RATE", "1.5")]))
            .unwrap_err();
        assert!(err.message.contains("exploration_rate"));
    }

    #[test]
    fn test_parse_errors_point_at_the_failing_key() {
        let port = ServerConfig::default()
            .with_env(env(&[("PORT", "x")]))
            .unwrap_err();
        let delay = ServerConfig::default()
            .with_env(env(&[("COMPUTER_DELAY_MS", "x")]))
            .unwrap_err();
        assert!(port.file.ends_with("config.rs"));
        assert_ne!(port.line, delay.line);
    }

    #[test]
    fn test_max_games_override() {
        assert_eq!(ServerConfig::default().max_games(), &DEFAULT_MAX_GAMES);
        let config = ServerConfig::default()
            .with_env(env(&[("MAX_GAMES", "50")]))
            .unwrap();
        assert_eq!(config.max_games(), &50);
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000\ncomputer_delay_ms = 250\napp_url = \"https://game.test\"").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port(), &4000);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.computer_delay(), Duration::from_millis(250));
        assert_eq!(config.app_url().as_deref(), Some("https://game.test"));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"three thousand\"").unwrap();
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = ServerConfig::default().with_listen(Some("0.0.0.0".into()), Some(9000));
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), &9000);
    }
}
