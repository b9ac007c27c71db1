//! Promotion records as they flow through the pipeline.
//!
//! A `PromotionRecord` is built by a source adapter, handed to the store, and
//! passed to the notifier when it turns out to be new. Its identity is the
//! fingerprint: a digest of title and url only, so re-scraping the same
//! listing always collides with the stored copy.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::extract;
use crate::entities::{PromotionKind, PromotionModel};

/// Maximum number of characters kept from a listing title.
pub const MAX_TITLE_CHARS: usize = 150;

/// Number of hex characters kept from the title+url digest.
pub const FINGERPRINT_LEN: usize = 12;

const FOUND_AT_FORMAT: &str = "%d/%m %H:%M";

/// A scraped deal listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Classification of the deal
    pub kind: PromotionKind,
    /// Listing title, truncated to [`MAX_TITLE_CHARS`]
    pub title: String,
    /// Absolute link to the listing
    pub url: String,
    /// Label of the adapter that produced this record
    pub source_name: String,
    /// Discovery time, fixed at construction
    pub found_at: String,
    /// Advertised price
    pub price: Option<f64>,
    /// Transfer bonus, only for `BonusTransfer`
    pub bonus_percent: Option<i32>,
    /// Loyalty program label
    pub program: Option<String>,
    /// Normalised destination
    pub destination: Option<String>,
    /// Reserved for per-record notification tracking
    pub notified: bool,
}

impl PromotionRecord {
    /// Creates a record with no extracted fields, stamped with the current local time.
    pub fn new(
        kind: PromotionKind,
        title: &str,
        url: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self::new_at(kind, title, url, source_name, Local::now())
    }

    /// Like [`PromotionRecord::new`] with an explicit discovery time.
    pub fn new_at(
        kind: PromotionKind,
        title: &str,
        url: impl Into<String>,
        source_name: impl Into<String>,
        found_at: DateTime<Local>,
    ) -> Self {
        Self {
            kind,
            title: truncate_title(title),
            url: url.into(),
            source_name: source_name.into(),
            found_at: found_at.format(FOUND_AT_FORMAT).to_string(),
            price: None,
            bonus_percent: None,
            program: None,
            destination: None,
            notified: false,
        }
    }

    /// Classifies a listing title and fills every extractable field from it.
    ///
    /// The kind is `default_kind` unless the title mentions a transfer bonus.
    /// `bonus_percent` is only extracted for bonus transfers.
    pub fn from_title(
        default_kind: PromotionKind,
        title: &str,
        url: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        let is_bonus = extract::is_bonus_title(title);
        let kind = if is_bonus {
            PromotionKind::BonusTransfer
        } else {
            default_kind
        };

        let mut record = Self::new(kind, title, url, source_name);
        record.price = extract::extract_price(title);
        record.bonus_percent = if is_bonus {
            extract::extract_bonus_percent(title)
        } else {
            None
        };
        record.program = extract::identify_program(title);
        record.destination = extract::extract_destination(title);
        record
    }

    /// Deduplication key of this record.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.title, &self.url)
    }
}

impl From<PromotionModel> for PromotionRecord {
    fn from(model: PromotionModel) -> Self {
        Self {
            kind: model.kind,
            title: model.title,
            url: model.url,
            source_name: model.source_name,
            found_at: model.found_at,
            price: model.price,
            bonus_percent: model.bonus_percent,
            program: model.program,
            destination: model.destination,
            notified: model.notified,
        }
    }
}

/// Deterministic short digest of `title` followed by `url`.
#[must_use]
pub fn fingerprint(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(url.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Cuts a title to [`MAX_TITLE_CHARS`] characters (not bytes).
#[must_use]
pub fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}
