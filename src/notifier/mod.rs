//! Notifier - alert delivery for newly discovered promotions.
//!
//! Delivery is best effort. Every public method reduces channel failures to a
//! `false` return and a warning, so the ingestion cycle never fails because a
//! message could not be sent. A notifier without a channel silently does
//! nothing.

/// Message text builders
pub mod format;
/// Telegram Bot API channel
pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::core::promotion::PromotionRecord;
use crate::errors::Result;

pub use telegram::TelegramChannel;

/// Transport for alert messages.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one message.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Formats and sends alerts through an optional channel.
#[derive(Clone, Default)]
pub struct Notifier {
    channel: Option<Arc<dyn NotificationChannel>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl Notifier {
    /// A notifier that never sends anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { channel: None }
    }

    /// A notifier sending through `channel`.
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// Builds the notifier described by the configuration (Telegram or nothing).
    ///
    /// # Errors
    /// Returns `Error::Http` if the Telegram HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.telegram {
            Some(telegram) => Ok(Self::new(Arc::new(TelegramChannel::new(telegram)?))),
            None => Ok(Self::disabled()),
        }
    }

    /// Whether a channel is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    /// Sends one summary message for a batch of new promotions.
    ///
    /// Returns `false` without sending when the channel is unconfigured or the
    /// batch is empty, and `false` when delivery fails.
    pub async fn notify_summary(&self, records: &[PromotionRecord]) -> bool {
        if records.is_empty() {
            return false;
        }
        self.deliver(&format::format_summary(records)).await
    }

    /// Sends a detailed alert for one promotion.
    pub async fn notify_record(&self, record: &PromotionRecord) -> bool {
        self.deliver(&format::format_record(record)).await
    }

    async fn deliver(&self, text: &str) -> bool {
        let Some(channel) = &self.channel else {
            debug!("No notification channel configured; message dropped");
            return false;
        };
        match channel.send(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification failed: {}", e);
                false
            }
        }
    }
}
