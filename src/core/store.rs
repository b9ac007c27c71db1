//! Promotion store - deduplicating persistence and aggregate reads.
//!
//! Inserts are keyed by fingerprint and rely on the unique constraint of the
//! `promotions` table (`ON CONFLICT DO NOTHING`), so the check-then-insert is a
//! single atomic statement even when several callers race on the same
//! promotion. Stored rows are never updated.
//!
//! The `last_updated_at` scalar lives in the `system_state` key-value table.

use chrono::{DateTime, Local, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    core::promotion::PromotionRecord,
    entities::{Promotion, PromotionKind, SystemState, promotion, system_state},
    errors::Result,
};

const LAST_UPDATED_KEY: &str = "last_updated_at";
const LAST_UPDATED_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Aggregate figures over every stored promotion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PromotionStats {
    /// Number of `Flight` promotions
    pub flights: u64,
    /// Number of `Miles` promotions
    pub miles: u64,
    /// Number of `BonusTransfer` promotions
    pub bonus_transfers: u64,
    /// Sum of the per-kind counts
    pub total: u64,
    /// Lowest price above zero, if any
    pub min_price: Option<f64>,
    /// Highest bonus percentage, if any
    pub max_bonus_percent: Option<i32>,
}

impl PromotionStats {
    /// Count for a single kind.
    #[must_use]
    pub const fn count(&self, kind: PromotionKind) -> u64 {
        match kind {
            PromotionKind::Flight => self.flights,
            PromotionKind::Miles => self.miles,
            PromotionKind::BonusTransfer => self.bonus_transfers,
        }
    }
}

/// Persists `record` unless a promotion with the same fingerprint exists.
///
/// # Returns
/// * `Ok(true)` - the record was new and has been stored
/// * `Ok(false)` - a record with the same title and url was already stored
///
/// # Errors
/// Returns `Error::Database` if the insert fails for any reason other than the
/// duplicate fingerprint.
#[instrument(skip(db, record))]
pub async fn save<C>(db: &C, record: &PromotionRecord) -> Result<bool>
where
    C: ConnectionTrait,
{
    let fingerprint = record.fingerprint();

    let row = promotion::ActiveModel {
        fingerprint: Set(fingerprint.clone()),
        kind: Set(record.kind),
        title: Set(record.title.clone()),
        url: Set(record.url.clone()),
        source_name: Set(record.source_name.clone()),
        found_at: Set(record.found_at.clone()),
        price: Set(record.price),
        bonus_percent: Set(record.bonus_percent),
        program: Set(record.program.clone()),
        destination: Set(record.destination.clone()),
        notified: Set(false),
        ..Default::default()
    };

    let inserted = Promotion::insert(row)
        .on_conflict(
            OnConflict::column(promotion::Column::Fingerprint)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        debug!(%fingerprint, "Stored new promotion '{}'", record.title);
    } else {
        debug!(%fingerprint, "Skipped known promotion '{}'", record.title);
    }
    Ok(inserted > 0)
}

/// Lists stored promotions, newest first.
///
/// # Arguments
/// * `kind` - Restrict to one kind; `None` returns every kind
/// * `limit` - Maximum number of rows
pub async fn query<C>(
    db: &C,
    kind: Option<PromotionKind>,
    limit: u64,
) -> Result<Vec<promotion::Model>>
where
    C: ConnectionTrait,
{
    let mut select = Promotion::find();
    if let Some(kind) = kind {
        select = select.filter(promotion::Column::Kind.eq(kind));
    }
    select
        .order_by_desc(promotion::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes per-kind counts, the lowest positive price and the highest bonus.
#[instrument(skip(db))]
pub async fn stats<C>(db: &C) -> Result<PromotionStats>
where
    C: ConnectionTrait,
{
    let flights = count_kind(db, PromotionKind::Flight).await?;
    let miles = count_kind(db, PromotionKind::Miles).await?;
    let bonus_transfers = count_kind(db, PromotionKind::BonusTransfer).await?;

    let min_price = Promotion::find()
        .select_only()
        .column_as(promotion::Column::Price.min(), "min_price")
        .filter(promotion::Column::Price.gt(0.0))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?
        .flatten();

    let max_bonus_percent = Promotion::find()
        .select_only()
        .column_as(promotion::Column::BonusPercent.max(), "max_bonus")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();

    Ok(PromotionStats {
        flights,
        miles,
        bonus_transfers,
        total: flights + miles + bonus_transfers,
        min_price,
        max_bonus_percent,
    })
}

async fn count_kind<C>(db: &C, kind: PromotionKind) -> Result<u64>
where
    C: ConnectionTrait,
{
    Promotion::find()
        .filter(promotion::Column::Kind.eq(kind))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Reads the timestamp of the last ingestion cycle, if one has run.
pub async fn get_last_updated<C>(db: &C) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_UPDATED_KEY))
        .one(db)
        .await?;
    Ok(state.map(|s| s.value))
}

/// Overwrites the last-updated timestamp with `now` and returns the stored text.
pub async fn set_last_updated<C>(db: &C, now: DateTime<Local>) -> Result<String>
where
    C: ConnectionTrait,
{
    let value = now.format(LAST_UPDATED_FORMAT).to_string();
    let row = system_state::ActiveModel {
        key: Set(LAST_UPDATED_KEY.to_string()),
        value: Set(value.clone()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    SystemState::insert(row)
        .on_conflict(
            OnConflict::column(system_state::Column::Key)
                .update_columns([system_state::Column::Value, system_state::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Set {} = {}", LAST_UPDATED_KEY, value);
    Ok(value)
}
