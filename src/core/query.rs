//! Read-only accessors used by the presentation layer.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::instrument;

use crate::{
    config::AppConfig,
    core::store::{self, PromotionStats},
    entities::{PromotionKind, PromotionModel},
    errors::Result,
};

/// Upper bound on the number of promotions returned by one listing.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Shown in place of the last-updated timestamp before the first cycle.
pub const NEVER_UPDATED: &str = "Nunca";

/// Everything the dashboard renders on its landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Aggregates over the whole store
    pub stats: PromotionStats,
    /// Newest promotions first, at most [`MAX_PAGE_SIZE`]
    pub promotions: Vec<PromotionModel>,
    /// Time of the last cycle, or [`NEVER_UPDATED`]
    pub last_updated: String,
    /// Whether alerts are being sent
    pub notifications_enabled: bool,
}

/// Lists promotions newest first.
///
/// `filter` is `""` or `"all"` for every kind, otherwise a kind name such as
/// `"flight"`. `limit` is clamped to [`MAX_PAGE_SIZE`].
///
/// # Errors
/// * `Error::UnknownKind` - `filter` names no kind
/// * `Error::Database` - the store could not be read
pub async fn list_promotions<C>(db: &C, filter: &str, limit: u64) -> Result<Vec<PromotionModel>>
where
    C: ConnectionTrait,
{
    let kind = PromotionKind::parse_filter(filter)?;
    store::query(db, kind, limit.min(MAX_PAGE_SIZE)).await
}

/// Aggregate figures over every stored promotion.
pub async fn get_stats<C>(db: &C) -> Result<PromotionStats>
where
    C: ConnectionTrait,
{
    store::stats(db).await
}

/// Time of the last cycle, or [`NEVER_UPDATED`].
pub async fn last_updated<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    Ok(store::get_last_updated(db)
        .await?
        .unwrap_or_else(|| NEVER_UPDATED.to_string()))
}

/// Builds the dashboard snapshot.
#[instrument(skip_all)]
pub async fn overview<C>(db: &C, config: &AppConfig) -> Result<Overview>
where
    C: ConnectionTrait,
{
    Ok(Overview {
        stats: get_stats(db).await?,
        promotions: store::query(db, None, MAX_PAGE_SIZE).await?,
        last_updated: last_updated(db).await?,
        notifications_enabled: config.notifications_enabled(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelegramConfig;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_list_promotions_filters_and_caps() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..60 {
            store::save(&db, &flight_record(&format!("Voo {i}"), None)).await?;
        }
        store::save(&db, &miles_record("Milhas")).await?;

        assert_eq!(list_promotions(&db, "all", 500).await?.len(), 50);
        assert_eq!(list_promotions(&db, "", 5).await?.len(), 5);

        let miles = list_promotions(&db, "miles", 50).await?;
        assert_eq!(miles.len(), 1);
        assert_eq!(miles[0].kind, PromotionKind::Miles);

        let flights = list_promotions(&db, "flight", 3).await?;
        let titles: Vec<_> = flights.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Voo 59", "Voo 58", "Voo 57"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_promotions_rejects_unknown_filter() -> Result<()> {
        let db = setup_test_db().await?;
        let result = list_promotions(&db, "hotel", 10).await;
        assert!(matches!(result, Err(Error::UnknownKind { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_last_updated_defaults_to_never() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(last_updated(&db).await?, NEVER_UPDATED);
        Ok(())
    }

    #[tokio::test]
    async fn test_overview_snapshot() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        store::save(&db, &flight_record("Voo Lisboa", Some(2500.0))).await?;
        store::save(&db, &bonus_record("Bônus Livelo", Some(90))).await?;
        store::set_last_updated(&db, chrono::Local::now()).await?;

        let mut config = AppConfig::default();
        config.telegram = Some(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
        });

        let overview = overview(&db, &config).await?;
        assert_eq!(overview.stats.total, 2);
        assert_eq!(overview.promotions.len(), 2);
        assert_eq!(overview.promotions[0].title, "Bônus Livelo");
        assert_ne!(overview.last_updated, NEVER_UPDATED);
        assert!(overview.notifications_enabled);
        Ok(())
    }
}
