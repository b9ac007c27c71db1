//! Reqwest + scraper backed adapter for article-listing sites.
//!
//! A page is fetched once, parsed with CSS selectors from its
//! [`SourceProfile`], and every matching article (up to the profile's cap)
//! becomes a candidate record. Each failure stays local: a page that cannot
//! be fetched yields nothing, an article that cannot be read is skipped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::SourceAdapter;
use crate::config::SourceProfile;
use crate::core::promotion::PromotionRecord;
use crate::entities::PromotionKind;
use crate::errors::{Error, Result};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9";

/// Adapter for one site described by a [`SourceProfile`].
pub struct HtmlSource {
    profile: SourceProfile,
    base_url: Url,
    article_selector: Selector,
    link_selector: Selector,
    client: Client,
}

impl std::fmt::Debug for HtmlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlSource")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl HtmlSource {
    /// Builds an adapter whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns `Error::Selector` for unparsable selectors, `Error::Config` for
    /// an invalid base URL, and `Error::Http` if the client cannot be built.
    pub fn new(profile: SourceProfile, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&profile.base_url).map_err(|e| Error::Config {
            message: format!("Invalid base_url '{}' for {}: {e}", profile.base_url, profile.name),
        })?;
        let article_selector = parse_selector(&profile.article_selector)?;
        let link_selector = parse_selector(&profile.link_selector)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            profile,
            base_url,
            article_selector,
            link_selector,
            client,
        })
    }

    /// The profile this adapter scrapes.
    #[must_use]
    pub const fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    /// Downloads a page body, treating any non-success status as an error.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Extracts candidate records from a listing page.
    ///
    /// At most `max_articles` articles are inspected; malformed ones are
    /// skipped and logged at debug level.
    #[must_use]
    pub fn parse_listing(&self, body: &str, default_kind: PromotionKind) -> Vec<PromotionRecord> {
        let document = Html::parse_document(body);
        document
            .select(&self.article_selector)
            .take(self.profile.max_articles)
            .filter_map(|article| match self.read_article(article, default_kind) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(source = %self.profile.name, error = %e, "Skipping article");
                    None
                }
            })
            .collect()
    }

    fn read_article(
        &self,
        article: ElementRef<'_>,
        default_kind: PromotionKind,
    ) -> Result<PromotionRecord> {
        let link = article
            .select(&self.link_selector)
            .next()
            .ok_or_else(|| malformed("no title link"))?;

        let title = link
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if title.is_empty() {
            return Err(malformed("empty title"));
        }

        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| malformed("title link has no href"))?;
        let url = self
            .base_url
            .join(href.trim())
            .map_err(|e| malformed(&format!("unresolvable href '{href}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(malformed("non-http href"));
        }

        Ok(PromotionRecord::from_title(
            default_kind,
            &title,
            url.to_string(),
            self.profile.name.clone(),
        ))
    }
}

#[async_trait]
impl SourceAdapter for HtmlSource {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn fetch_candidates(&self) -> Vec<PromotionRecord> {
        let mut records = Vec::new();
        for page in &self.profile.pages {
            match self.fetch_page(&page.url).await {
                Ok(body) => {
                    let found = self.parse_listing(&body, page.kind);
                    info!(
                        source = %self.profile.name,
                        url = %page.url,
                        count = found.len(),
                        "Parsed listing page"
                    );
                    records.extend(found);
                }
                Err(e) => {
                    warn!(
                        source = %self.profile.name,
                        url = %page.url,
                        error = %e,
                        "Fetch failed, page skipped"
                    );
                }
            }
        }
        records
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn malformed(reason: &str) -> Error {
    Error::MalformedArticle {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::SourcePage;
    use crate::config::sources::default_sources;
    use crate::test_utils::serve_http;
    use axum::http::StatusCode;

    fn test_profile(pages: Vec<SourcePage>, max_articles: usize) -> SourceProfile {
        SourceProfile {
            name: "Test Deals".to_string(),
            base_url: "https://deals.example.com".to_string(),
            pages,
            article_selector: "article, .post-item".to_string(),
            link_selector: "h2 a, h3 a, a.post-title".to_string(),
            max_articles,
        }
    }

    fn test_source() -> HtmlSource {
        HtmlSource::new(test_profile(Vec::new(), 25), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_malformed_article_is_skipped() {
        let html = r#"
            <html><body>
              <article><h2><a href="/miami">Miami por R$ 1.999</a></h2></article>
              <article><p>Sem link nenhum aqui</p></article>
            </body></html>
        "#;
        let records = test_source().parse_listing(html, PromotionKind::Flight);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Miami por R$ 1.999");
    }

    #[test]
    fn test_relative_links_become_absolute() {
        let html = r#"
            <article><h3><a href="/promo/paris">Paris</a></h3></article>
            <article><h3><a href="https://other.example.org/roma">Roma</a></h3></article>
        "#;
        let records = test_source().parse_listing(html, PromotionKind::Flight);
        assert_eq!(records[0].url, "https://deals.example.com/promo/paris");
        assert_eq!(records[1].url, "https://other.example.org/roma");
    }

    #[test]
    fn test_fields_extracted_from_title() {
        let html = r#"
            <div class="post-item">
              <a class="post-title" href="/bonus">
                Livelo: transfira com 80% de bônus
              </a>
            </div>
            <article><h2><a href="/ny">Pacote para Nova York por R$ 3.450,00</a></h2></article>
        "#;
        let records = test_source().parse_listing(html, PromotionKind::Miles);
        assert_eq!(records.len(), 2);

        let bonus = records
            .iter()
            .find(|r| r.kind == PromotionKind::BonusTransfer)
            .unwrap();
        assert_eq!(bonus.title, "Livelo: transfira com 80% de bônus");
        assert_eq!(bonus.bonus_percent, Some(80));
        assert_eq!(bonus.program.as_deref(), Some("Livelo"));
        assert_eq!(bonus.source_name, "Test Deals");

        let trip = records
            .iter()
            .find(|r| r.kind == PromotionKind::Miles)
            .unwrap();
        assert_eq!(trip.price, Some(3450.0));
        assert_eq!(trip.destination.as_deref(), Some("Nova York"));
        assert_eq!(trip.bonus_percent, None);
    }

    #[test]
    fn test_article_cap_is_respected() {
        let html: String = (0..10)
            .map(|i| format!(r#"<article><h2><a href="/p{i}">Promo {i}</a></h2></article>"#))
            .collect();
        let source =
            HtmlSource::new(test_profile(Vec::new(), 3), Duration::from_secs(5)).unwrap();
        assert_eq!(source.parse_listing(&html, PromotionKind::Flight).len(), 3);
    }

    #[test]
    fn test_missing_href_and_empty_title_are_skipped() {
        let html = r#"
            <article><h2><a>Sem href</a></h2></article>
            <article><h2><a href="/vazio">   </a></h2></article>
            <article><h2><a href="/ok">Lisboa</a></h2></article>
        "#;
        let records = test_source().parse_listing(html, PromotionKind::Flight);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].destination.as_deref(), Some("Lisboa"));
    }

    #[test]
    fn test_non_http_links_are_skipped() {
        let html = r#"
            <article><h2><a href="javascript:void(0)">Miami</a></h2></article>
            <article><h2><a href="mailto:x@y.z">Paris</a></h2></article>
            <article><h2><a href="ftp://deals.example.com/roma">Roma</a></h2></article>
            <article><h2><a href="/lisboa">Lisboa</a></h2></article>
        "#;
        let records = test_source().parse_listing(html, PromotionKind::Flight);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://deals.example.com/lisboa");
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut profile = test_profile(Vec::new(), 5);
        profile.link_selector = "h2 >>> a[".to_string();
        let result = HtmlSource::new(profile, Duration::from_secs(5));
        assert!(matches!(result, Err(Error::Selector { .. })));
    }

    #[test]
    fn test_default_profiles_build() {
        for profile in default_sources() {
            assert!(HtmlSource::new(profile, Duration::from_secs(15)).is_ok());
        }
    }

    #[tokio::test]
    async fn test_unreachable_site_yields_no_candidates() {
        let source = HtmlSource::new(
            test_profile(
                vec![SourcePage {
                    url: "http://127.0.0.1:9/".to_string(),
                    kind: PromotionKind::Flight,
                }],
                25,
            ),
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(source.fetch_candidates().await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_yields_no_candidates() {
        let url = serve_http(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"<article><h2><a href="/x">Miami</a></h2></article>"#,
        )
        .await
        .unwrap();
        let source = HtmlSource::new(
            test_profile(
                vec![SourcePage {
                    url,
                    kind: PromotionKind::Flight,
                }],
                25,
            ),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(source.fetch_candidates().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_candidates_from_live_page() {
        let url = serve_http(
            StatusCode::OK,
            r#"<html><body>
                 <article><h2><a href="/orlando">Orlando por R$ 2.300</a></h2></article>
                 <article><h2><a href="/esfera">Esfera com 100% de bônus</a></h2></article>
               </body></html>"#,
        )
        .await
        .unwrap();
        let source = HtmlSource::new(
            test_profile(
                vec![SourcePage {
                    url,
                    kind: PromotionKind::Flight,
                }],
                25,
            ),
            Duration::from_secs(5),
        )
        .unwrap();

        let records = source.fetch_candidates().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, Some(2300.0));
        assert_eq!(records[1].kind, PromotionKind::BonusTransfer);
        assert_eq!(records[1].bonus_percent, Some(100));
    }
}
