//! Text extractors - heuristic field extraction from listing titles.
//!
//! Every function here is pure and total: a pattern that is not found, or a
//! number that does not parse, is reported as `None` rather than an error.
//! The vocabularies are plain data tables so new destinations or programs can
//! be added without touching the matching logic. Table order is the match
//! priority.

use regex::Regex;
use std::sync::LazyLock;

/// Destinations recognised in titles, matched in this order.
pub const DESTINATIONS: &[&str] = &[
    "miami",
    "orlando",
    "nova york",
    "new york",
    "nova iorque",
    "paris",
    "londres",
    "roma",
    "lisboa",
    "porto",
    "madrid",
    "barcelona",
    "cancún",
    "cancun",
    "buenos aires",
    "santiago",
    "dubai",
    "tóquio",
    "tokyo",
    "los angeles",
    "milão",
    "milao",
    "amsterdam",
    "berlim",
];

/// Loyalty programs as `(lowercase key, display label)`, matched in this order.
pub const PROGRAMS: &[(&str, &str)] = &[
    ("smiles", "Smiles"),
    ("latam", "LATAM Pass"),
    ("azul", "TudoAzul"),
    ("livelo", "Livelo"),
    ("esfera", "Esfera"),
];

/// Title fragments that mark a bonus-transfer promotion.
pub const BONUS_KEYWORDS: &[&str] = &["bônus", "bonus", "bonificad"];

// Patterns are literals; a failure here is a programming error caught by the tests below.
#[allow(clippy::expect_used)]
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$\s*([\d.,]+)").expect("price pattern is valid"));

#[allow(clippy::expect_used)]
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*%").expect("percent pattern is valid"));

/// Extracts a Brazilian-real amount such as `R$ 1.234,00` as `1234.0`.
///
/// Dots are treated as thousands separators and the comma as the decimal
/// separator.
#[must_use]
pub fn extract_price(text: &str) -> Option<f64> {
    let raw = PRICE_RE.captures(text)?.get(1)?.as_str();
    let normalised = raw.replace('.', "").replace(',', ".");
    normalised.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Extracts the first `<digits>%` percentage in the text.
#[must_use]
pub fn extract_bonus_percent(text: &str) -> Option<i32> {
    PERCENT_RE.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Finds the first known destination mentioned in the text, title-cased.
#[must_use]
pub fn extract_destination(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    DESTINATIONS
        .iter()
        .find(|destination| lowered.contains(*destination))
        .map(|destination| title_case(destination))
}

/// Finds the first known loyalty program mentioned in the text.
#[must_use]
pub fn identify_program(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    PROGRAMS
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, label)| (*label).to_string())
}

/// Whether the text advertises a points-transfer bonus.
#[must_use]
pub fn is_bonus_title(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BONUS_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
