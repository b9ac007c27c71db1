//! Source adapters - one per scraped site.
//!
//! An adapter turns a site into candidate [`PromotionRecord`]s. Adapters never
//! fail a cycle: a site that is down, slow or reshaped simply contributes no
//! candidates, which is why [`SourceAdapter::fetch_candidates`] returns a plain
//! `Vec`.

mod html;

pub use html::HtmlSource;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::SourceProfile;
use crate::core::promotion::PromotionRecord;
use crate::errors::Result;

/// A scraped site.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Label used as `source_name` on produced records.
    fn name(&self) -> &str;

    /// Fetches and parses the site's listings.
    async fn fetch_candidates(&self) -> Vec<PromotionRecord>;
}

/// Builds one HTML adapter per profile, sharing the given request timeout.
///
/// # Errors
/// Returns an error if a profile has an invalid selector or base URL, or the
/// HTTP client cannot be built.
pub fn build_adapters(
    profiles: Vec<SourceProfile>,
    timeout: Duration,
) -> Result<Vec<Box<dyn SourceAdapter>>> {
    profiles
        .into_iter()
        .map(|profile| {
            HtmlSource::new(profile, timeout).map(|source| Box::new(source) as Box<dyn SourceAdapter>)
        })
        .collect()
}
