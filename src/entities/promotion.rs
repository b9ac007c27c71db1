//! Promotion entity - One scraped deal listing as stored in the database.
//!
//! Rows are insert-only: the `fingerprint` column is unique and a rediscovered
//! promotion is never written twice or updated in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Classification of a promotion.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// Discounted airfare
    #[sea_orm(string_value = "flight")]
    Flight,
    /// Miles / points purchase or redemption deal
    #[sea_orm(string_value = "miles")]
    Miles,
    /// Bonus when transferring points between programs
    #[sea_orm(string_value = "bonus_transfer")]
    BonusTransfer,
}

impl PromotionKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::Flight, Self::Miles, Self::BonusTransfer];

    /// Stable identifier used in storage and filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Miles => "miles",
            Self::BonusTransfer => "bonus_transfer",
        }
    }

    /// Parses a dashboard filter value. `"all"` and the empty string mean no filter.
    ///
    /// # Errors
    /// Returns `Error::UnknownKind` for any other unrecognised value.
    pub fn parse_filter(value: &str) -> crate::errors::Result<Option<Self>> {
        match value.trim() {
            "" | "all" => Ok(None),
            other => Self::ALL
                .into_iter()
                .find(|kind| kind.as_str() == other)
                .map(Some)
                .ok_or_else(|| Error::UnknownKind {
                    value: other.to_string(),
                }),
        }
    }
}

impl std::fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Promotion database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    /// Insertion sequence; newest rows have the highest id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short digest of title + url, the deduplication key
    #[sea_orm(unique)]
    pub fingerprint: String,
    /// Classification of the deal
    pub kind: PromotionKind,
    /// Listing title, at most 150 characters
    pub title: String,
    /// Absolute link to the listing
    pub url: String,
    /// Which source adapter produced the row
    pub source_name: String,
    /// When the promotion was first seen (`dd/mm HH:MM`)
    pub found_at: String,
    /// Advertised price, if any
    pub price: Option<f64>,
    /// Transfer bonus percentage, only for bonus transfers
    pub bonus_percent: Option<i32>,
    /// Loyalty program label
    pub program: Option<String>,
    /// Normalised destination name
    pub destination: Option<String>,
    /// Reserved for per-record notification tracking
    pub notified: bool,
}

/// `Promotion` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert!(matches!(PromotionKind::parse_filter("all"), Ok(None)));
        assert!(matches!(PromotionKind::parse_filter(""), Ok(None)));
        assert!(matches!(
            PromotionKind::parse_filter("flight"),
            Ok(Some(PromotionKind::Flight))
        ));
        assert!(matches!(
            PromotionKind::parse_filter("bonus_transfer"),
            Ok(Some(PromotionKind::BonusTransfer))
        ));
        assert!(matches!(
            PromotionKind::parse_filter("cruise"),
            Err(Error::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PromotionKind::BonusTransfer).ok();
        assert_eq!(json.as_deref(), Some("\"bonus_transfer\""));
    }
}
