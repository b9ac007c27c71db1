//! Shared-secret trigger and liveness probe for the external scheduler.

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    core::ingest::{CycleReport, Ingestor},
    errors::{Error, Result},
};

/// Response of a successful triggered cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    /// Candidates scraped
    pub total: usize,
    /// Candidates newly stored
    pub new: usize,
    /// Completion time, RFC 3339
    pub timestamp: String,
}

impl TriggerOutcome {
    /// Stamps a cycle report with the current time.
    #[must_use]
    pub fn from_report(report: CycleReport) -> Self {
        Self {
            total: report.total_scraped,
            new: report.total_new,
            timestamp: Local::now().to_rfc3339(),
        }
    }
}

/// Liveness probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"ok"`
    pub status: &'static str,
    /// Current time, RFC 3339
    pub timestamp: String,
}

/// Checks `provided` against the configured trigger secret.
///
/// # Errors
/// Returns `Error::Unauthorized` on mismatch, and always when no secret is configured.
pub fn authorize(provided: &str, config: &AppConfig) -> Result<()> {
    match config.cron_secret.as_deref() {
        Some(expected) if expected == provided => Ok(()),
        Some(_) => {
            warn!("Rejected trigger with a wrong secret");
            Err(Error::Unauthorized)
        }
        None => {
            warn!("Rejected trigger: CRON_SECRET is not configured");
            Err(Error::Unauthorized)
        }
    }
}

/// Runs a notifying cycle if `provided` matches the configured secret.
///
/// Nothing is fetched or written when authorization fails.
///
/// # Errors
/// * `Error::Unauthorized` - wrong or unconfigured secret
/// * `Error::Database` - the cycle failed in the store
pub async fn run_triggered(
    ingestor: &Ingestor,
    config: &AppConfig,
    provided: &str,
) -> Result<TriggerOutcome> {
    authorize(provided, config)?;
    let report = ingestor.run_cycle(true).await?;
    info!("Triggered cycle: {} scraped, {} new", report.total_scraped, report.total_new);
    Ok(TriggerOutcome::from_report(report))
}

/// Liveness probe; never touches the store.
#[must_use]
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "ok",
        timestamp: Local::now().to_rfc3339(),
    }
}
