//! Message formatting for alerts.
//!
//! Messages use Telegram's HTML parse mode, so every piece of scraped text is
//! escaped before it is embedded. User-facing text is in Portuguese, matching
//! the scraped sites.

use crate::core::promotion::PromotionRecord;
use crate::entities::PromotionKind;

/// Emoji shown next to a kind.
#[must_use]
pub const fn kind_emoji(kind: PromotionKind) -> &'static str {
    match kind {
        PromotionKind::Flight => "✈️",
        PromotionKind::Miles => "🎯",
        PromotionKind::BonusTransfer => "🔥",
    }
}

/// Upper-case label shown next to a kind.
#[must_use]
pub const fn kind_label(kind: PromotionKind) -> &'static str {
    match kind {
        PromotionKind::Flight => "PASSAGEM",
        PromotionKind::Miles => "MILHAS",
        PromotionKind::BonusTransfer => "BÔNUS",
    }
}

const fn kind_plural(kind: PromotionKind) -> &'static str {
    match kind {
        PromotionKind::Flight => "passagens",
        PromotionKind::Miles => "milhas",
        PromotionKind::BonusTransfer => "bonificadas",
    }
}

/// Formats an amount as `R$ 1,234`: rounded to whole units with a comma
/// thousands separator.
#[must_use]
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return format!("R$ {value}");
    }
    // Rounded and finite; listing prices are far below i64 range.
    #[allow(clippy::cast_possible_truncation)]
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("R$ {sign}{grouped}")
}

/// Escapes the characters Telegram's HTML mode treats as markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Single-promotion alert.
#[must_use]
pub fn format_record(record: &PromotionRecord) -> String {
    let mut msg = format!(
        "{} <b>{}</b>\n\n📌 {}\n\n",
        kind_emoji(record.kind),
        kind_label(record.kind),
        escape_html(&record.title)
    );

    if let Some(price) = record.price.filter(|p| *p > 0.0) {
        msg.push_str(&format!("💰 <b>{}</b>\n", format_price(price)));
    }
    if let Some(bonus) = record.bonus_percent.filter(|b| *b > 0) {
        msg.push_str(&format!("🎁 <b>{bonus}% de bônus</b>\n"));
    }
    if let Some(program) = &record.program {
        msg.push_str(&format!("🏷️ {}\n", escape_html(program)));
    }
    if let Some(destination) = &record.destination {
        msg.push_str(&format!("📍 {}\n", escape_html(destination)));
    }

    msg.push_str(&format!("\n🔗 {}", escape_html(&record.url)));
    msg
}

/// Batch summary: totals per kind plus the best flight price and best bonus.
#[must_use]
pub fn format_summary(records: &[PromotionRecord]) -> String {
    let mut msg = format!(
        "📊 <b>{} novas promoções encontradas!</b>\n\n",
        records.len()
    );

    for kind in PromotionKind::ALL {
        let count = records.iter().filter(|r| r.kind == kind).count();
        if count > 0 {
            msg.push_str(&format!(
                "{} {count} {}\n",
                kind_emoji(kind),
                kind_plural(kind)
            ));
        }
    }

    let lowest_flight_price = records
        .iter()
        .filter(|r| r.kind == PromotionKind::Flight)
        .filter_map(|r| r.price)
        .filter(|p| *p > 0.0)
        .min_by(f64::total_cmp);
    if let Some(price) = lowest_flight_price {
        msg.push_str(&format!("\n💰 Menor preço: <b>{}</b>", format_price(price)));
    }

    let highest_bonus = records
        .iter()
        .filter(|r| r.kind == PromotionKind::BonusTransfer)
        .filter_map(|r| r.bonus_percent)
        .filter(|b| *b > 0)
        .max();
    if let Some(bonus) = highest_bonus {
        msg.push_str(&format!("\n🎁 Maior bônus: <b>{bonus}%</b>"));
    }

    msg
}
