//! Source profile configuration.
//!
//! A profile describes one scraped site: where its listing pages are, which
//! kind each page defaults to, and the CSS selectors that find articles and
//! their title links. The two built-in sites are defined by
//! [`default_sources`]; a `sources.toml` file can replace them.
//!
//! ```toml
//! [[sources]]
//! name = "Passagens Imperdíveis"
//! base_url = "https://www.passagensimperdiveis.com.br"
//! article_selector = "article, .post"
//! link_selector = "h2 a, h3 a, a.title"
//! max_articles = 20
//!
//! [[sources.pages]]
//! url = "https://www.passagensimperdiveis.com.br"
//! kind = "flight"
//! ```

use crate::entities::PromotionKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire sources file
#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    /// Sites to scrape, in run order
    pub sources: Vec<SourceProfile>,
}

/// One scraped site.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceProfile {
    /// Label stored as `source_name` on every record
    pub name: String,
    /// Base used to resolve relative links
    pub base_url: String,
    /// Listing pages to fetch
    pub pages: Vec<SourcePage>,
    /// Selector matching one article per promotion
    pub article_selector: String,
    /// Selector, relative to the article, matching the title link
    pub link_selector: String,
    /// Cap on articles read per page
    pub max_articles: usize,
}

/// A listing page and the kind its articles default to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourcePage {
    /// Absolute page URL
    pub url: String,
    /// Kind assigned unless the title advertises a bonus
    pub kind: PromotionKind,
}

/// The built-in site profiles.
#[must_use]
pub fn default_sources() -> Vec<SourceProfile> {
    vec![
        SourceProfile {
            name: "Melhores Destinos".to_string(),
            base_url: "https://www.melhoresdestinos.com.br".to_string(),
            pages: vec![
                SourcePage {
                    url: "https://www.melhoresdestinos.com.br/promocoes-de-passagens-aereas"
                        .to_string(),
                    kind: PromotionKind::Flight,
                },
                SourcePage {
                    url: "https://www.melhoresdestinos.com.br/categoria/milhas-aereas".to_string(),
                    kind: PromotionKind::Miles,
                },
            ],
            article_selector: "article, .post-item".to_string(),
            link_selector: "h2 a, h3 a, a.post-title".to_string(),
            max_articles: 25,
        },
        SourceProfile {
            name: "Passagens Imperdíveis".to_string(),
            base_url: "https://www.passagensimperdiveis.com.br".to_string(),
            pages: vec![SourcePage {
                url: "https://www.passagensimperdiveis.com.br".to_string(),
                kind: PromotionKind::Flight,
            }],
            article_selector: "article, .post".to_string(),
            link_selector: "h2 a, h3 a, a.title".to_string(),
            max_articles: 20,
        },
    ]
}

/// Parses source profiles from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML is invalid, required fields are
/// missing, or the file lists no sources.
pub fn parse_sources(contents: &str) -> Result<Vec<SourceProfile>> {
    let file: SourcesFile = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse sources file: {e}"),
    })?;
    if file.sources.is_empty() {
        return Err(Error::Config {
            message: "Sources file does not define any [[sources]]".to_string(),
        });
    }
    Ok(file.sources)
}

/// Loads source profiles from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or parsed.
pub fn load_sources<P: AsRef<Path>>(path: P) -> Result<Vec<SourceProfile>> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading source profiles from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read sources file {path_ref:?}: {e}"),
    })?;
    parse_sources(&contents)
}

/// Loads `path` when given, otherwise falls back to [`default_sources`].
///
/// # Errors
/// Returns `Error::Config` if a given file cannot be read or parsed.
pub fn load_sources_or_default(path: Option<&Path>) -> Result<Vec<SourceProfile>> {
    path.map_or_else(|| Ok(default_sources()), load_sources)
}
