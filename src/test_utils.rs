//! Shared test utilities for `promo-radar`.
//!
//! Helpers for setting up test databases, building records with sensible
//! defaults, fake adapters and channels, and a throwaway HTTP server.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{Router, http::StatusCode, response::Html};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{
    core::promotion::PromotionRecord,
    entities::PromotionKind,
    errors::{Error, Result},
    notifier::NotificationChannel,
    sources::SourceAdapter,
};

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

fn test_url(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!("https://example.com/{slug}")
}

/// A flight promotion with a url derived from `title`.
///
/// # Defaults
/// * `source_name`: `"Test Source"`
pub fn flight_record(title: &str, price: Option<f64>) -> PromotionRecord {
    let mut record =
        PromotionRecord::new(PromotionKind::Flight, title, test_url(title), "Test Source");
    record.price = price;
    record
}

/// A miles promotion with no extracted fields.
pub fn miles_record(title: &str) -> PromotionRecord {
    PromotionRecord::new(PromotionKind::Miles, title, test_url(title), "Test Source")
}

/// A bonus-transfer promotion with no price.
pub fn bonus_record(title: &str, bonus_percent: Option<i32>) -> PromotionRecord {
    let mut record = PromotionRecord::new(
        PromotionKind::BonusTransfer,
        title,
        test_url(title),
        "Test Source",
    );
    record.bonus_percent = bonus_percent;
    record
}

/// Channel that keeps every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<String>>,
}

impl RecordingChannel {
    /// Messages sent so far, in order.
    #[allow(clippy::unwrap_used)]
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    #[allow(clippy::unwrap_used)]
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Channel that rejects every message.
#[derive(Debug)]
pub struct FailingChannel;

#[async_trait]
impl NotificationChannel for FailingChannel {
    async fn send(&self, _text: &str) -> Result<()> {
        Err(Error::HttpStatus { status: 500 })
    }
}

/// Adapter returning a fixed list of candidates on every fetch.
#[derive(Debug)]
pub struct StaticSource {
    name: String,
    records: Vec<PromotionRecord>,
}

impl StaticSource {
    /// An adapter named `name` producing `records`.
    pub fn new(name: &str, records: Vec<PromotionRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }
}

#[async_trait]
impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self) -> Vec<PromotionRecord> {
        self.records.clone()
    }
}

/// Starts a local HTTP server answering every request, whatever its method
/// or path, with `status` and `body`. Returns its base url
/// (`http://127.0.0.1:<port>`).
pub async fn serve_http(status: StatusCode, body: &str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let body = body.to_string();
    let app = Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, Html(body)) }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{addr}"))
}
