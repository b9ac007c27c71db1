//! Application settings loaded from environment variables.
//!
//! The binary loads `.env` with `dotenvy` and then builds one [`AppConfig`]
//! that is passed explicitly to everything that needs it. Lookups go through
//! a closure so tests can supply values without touching the process
//! environment.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default timeout for every outbound scrape request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Credentials for the Telegram notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`
    pub bot_token: String,
    /// Chat that receives the alerts
    pub chat_id: String,
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SeaORM` connection URL for the promotions database
    pub database_url: String,
    /// Notification channel; `None` disables notifications
    pub telegram: Option<TelegramConfig>,
    /// Shared secret guarding the cycle trigger; `None` rejects every trigger
    pub cron_secret: Option<String>,
    /// Timeout for each scrape request
    pub http_timeout: Duration,
    /// Optional TOML file describing the scraped sites
    pub sources_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            telegram: None,
            cron_secret: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            sources_path: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Config` if `HTTP_TIMEOUT_SECS` is set but is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    /// Returns `Error::Config` if `HTTP_TIMEOUT_SECS` is set but is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID is set; notifications disabled.");
                None
            }
            (None, None) => None,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Config {
                        message: format!("HTTP_TIMEOUT_SECS must be a positive integer, got '{raw}'"),
                    });
                }
            },
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let config = Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            telegram,
            cron_secret: get("CRON_SECRET"),
            http_timeout,
            sources_path: get("SOURCES_PATH").map(PathBuf::from),
        };

        info!(
            database_url = %config.database_url,
            notifications = config.notifications_enabled(),
            trigger_secret = config.cron_secret.is_some(),
            "Loaded application configuration"
        );
        Ok(config)
    }

    /// Whether a notification channel is configured.
    #[must_use]
    pub const fn notifications_enabled(&self) -> bool {
        self.telegram.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.telegram.is_none());
        assert!(config.cron_secret.is_none());
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(!config.notifications_enabled());
    }

    #[test]
    fn test_full_configuration() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("CRON_SECRET", "s3cret"),
            ("HTTP_TIMEOUT_SECS", "10"),
            ("SOURCES_PATH", "sources.toml"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(
            config.telegram,
            Some(TelegramConfig {
                bot_token: "123:abc".to_string(),
                chat_id: "42".to_string(),
            })
        );
        assert_eq!(config.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.sources_path, Some(PathBuf::from("sources.toml")));
    }

    #[test]
    fn test_partial_telegram_credentials_disable_channel() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert!(config.telegram.is_none());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "   "),
        ]))
        .unwrap();
        assert!(config.telegram.is_none());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("HTTP_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = AppConfig::from_lookup(lookup_from(&[("HTTP_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
