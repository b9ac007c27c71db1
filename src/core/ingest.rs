//! Ingestion orchestrator - one full fetch → dedup → persist → notify cycle.
//!
//! Adapters run concurrently because they only do independent network I/O.
//! Their results are then saved one at a time, in adapter order, so
//! discovery order is deterministic and every fingerprint check-then-insert
//! goes through the store's atomic insert.

use std::time::Duration;

use chrono::Local;
use futures::future::join_all;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    core::{promotion::PromotionRecord, store},
    entities::PromotionKind,
    errors::Result,
    notifier::Notifier,
    sources::SourceAdapter,
};

/// Pause after each highlight message, to stay under the channel's rate limit.
pub const NOTIFY_PACING: Duration = Duration::from_secs(1);

/// Maximum number of individually announced promotions per cycle.
pub const MAX_HIGHLIGHTS: usize = 3;

const TOP_PER_CATEGORY: usize = 2;

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Candidates returned by all adapters together
    pub total_scraped: usize,
    /// Candidates that were not already stored
    pub total_new: usize,
}

/// Runs ingestion cycles over a fixed set of adapters.
pub struct Ingestor {
    db: DatabaseConnection,
    sources: Vec<Box<dyn SourceAdapter>>,
    notifier: Notifier,
    pacing: Duration,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("notifier", &self.notifier)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Creates an orchestrator with the default notification pacing.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        sources: Vec<Box<dyn SourceAdapter>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            db,
            sources,
            notifier,
            pacing: NOTIFY_PACING,
        }
    }

    /// Overrides the pause between highlight messages.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// The database this orchestrator writes to.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Whether cycles can send notifications.
    #[must_use]
    pub const fn notifications_enabled(&self) -> bool {
        self.notifier.is_configured()
    }

    /// Runs one cycle.
    ///
    /// The last-updated timestamp is written even when nothing new was
    /// found. Notifications are only attempted when `should_notify` is set,
    /// something new was stored and a channel is configured.
    ///
    /// # Errors
    /// Returns `Error::Database` if the store fails; no counts are reported
    /// in that case.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, should_notify: bool) -> Result<CycleReport> {
        let batches = join_all(self.sources.iter().map(|source| source.fetch_candidates())).await;
        let candidates: Vec<PromotionRecord> = batches.into_iter().flatten().collect();

        let mut new_records = Vec::new();
        for candidate in &candidates {
            if store::save(&self.db, candidate).await? {
                new_records.push(candidate.clone());
            }
        }

        store::set_last_updated(&self.db, Local::now()).await?;

        let report = CycleReport {
            total_scraped: candidates.len(),
            total_new: new_records.len(),
        };
        info!(
            total_scraped = report.total_scraped,
            total_new = report.total_new,
            "Ingestion cycle finished"
        );

        if should_notify && !new_records.is_empty() && self.notifier.is_configured() {
            self.announce(&new_records).await;
        }

        Ok(report)
    }

    async fn announce(&self, new_records: &[PromotionRecord]) {
        self.notifier.notify_summary(new_records).await;

        for record in select_highlights(new_records) {
            self.notifier.notify_record(record).await;
            tokio::time::sleep(self.pacing).await;
        }
    }
}

/// Picks the promotions announced individually.
///
/// Up to two bonus transfers with the highest bonus, followed by up to two
/// priced promotions with the lowest price, capped at [`MAX_HIGHLIGHTS`].
/// Ties keep discovery order. A record may appear in both lists.
#[must_use]
pub fn select_highlights(records: &[PromotionRecord]) -> Vec<&PromotionRecord> {
    let mut top_bonus: Vec<&PromotionRecord> = records
        .iter()
        .filter(|r| r.kind == PromotionKind::BonusTransfer)
        .filter(|r| r.bonus_percent.is_some_and(|b| b > 0))
        .collect();
    top_bonus.sort_by_key(|r| std::cmp::Reverse(r.bonus_percent));
    top_bonus.truncate(TOP_PER_CATEGORY);

    let mut cheapest: Vec<&PromotionRecord> = records
        .iter()
        .filter(|r| r.price.is_some_and(|p| p > 0.0))
        .collect();
    cheapest.sort_by(|a, b| {
        a.price
            .unwrap_or(f64::MAX)
            .total_cmp(&b.price.unwrap_or(f64::MAX))
    });
    cheapest.truncate(TOP_PER_CATEGORY);

    top_bonus
        .into_iter()
        .chain(cheapest)
        .take(MAX_HIGHLIGHTS)
        .collect()
}
