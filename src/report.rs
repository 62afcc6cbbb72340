// Text rendering of a comparison for the terminal
use crate::model::{CategoryResult, Comparison, ComparisonStatus, Domain};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Display names for known shops, keyed by canonical id.
const SHOP_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("mytek", "MyTek"),
    ("tunisianet", "Tunisianet"),
    ("spacenet", "Spacenet"),
    ("parafendri", "ParaFendri"),
    ("parashop", "ParaShop"),
    ("pharma-shop", "Pharma-Shop"),
];

/// Unknown shops are shown by their canonical id.
pub fn display_shop(shop: &str) -> &str {
    SHOP_DISPLAY_NAMES
        .iter()
        .find(|(id, _)| *id == shop)
        .map(|(_, name)| *name)
        .unwrap_or(shop)
}

pub fn format_price(price: Decimal, currency: &str) -> String {
    format!("{:.3} {}", price, currency)
}

pub fn render_comparison(comparison: &Comparison, currency: &str) -> String {
    let mut out = String::new();
    let present: Vec<&CategoryResult> = Domain::ALL
        .iter()
        .filter_map(|d| comparison.result.get(*d))
        .collect();

    if present.is_empty() {
        out.push_str("🛒 Bag is empty.\n");
        return out;
    }

    let _ = writeln!(out, "🏪 Prices per shop (revision {}):", comparison.revision);
    for category in present {
        render_category(&mut out, category, currency);
    }

    match comparison.status {
        ComparisonStatus::Complete if comparison.result.has_no_shop_data() => {
            out.push_str("\nNo shop carries any item of this bag.\n");
        }
        ComparisonStatus::Complete => {}
        ComparisonStatus::Partial { failed_lookups } => {
            let _ = writeln!(out, "⚠️ Prices unavailable for {} item(s).", failed_lookups);
        }
        ComparisonStatus::IndexUnavailable => {
            out.push_str("❌ Price comparison unavailable, try again later.\n");
        }
    }

    out
}

fn render_category(out: &mut String, category: &CategoryResult, currency: &str) {
    let _ = writeln!(out, "\n== {} ==", category.category_label);

    if category.shop_totals.is_empty() {
        out.push_str("No price data available\n");
        return;
    }

    let mut totals: Vec<_> = category.shop_totals.iter().collect();
    totals.sort_by(|a, b| a.total.cmp(&b.total).then_with(|| a.shop.cmp(&b.shop)));

    for shop_total in totals {
        let marker = if category.best_shop.as_deref() == Some(shop_total.shop.as_str()) {
            "👑"
        } else {
            "  "
        };
        let _ = write!(
            out,
            "{} {:<16} {}",
            marker,
            display_shop(&shop_total.shop),
            format_price(shop_total.total, currency)
        );
        if shop_total.missing_count > 0 {
            let _ = write!(out, "  ({} missing)", shop_total.missing_count);
        }
        out.push('\n');
    }

    if let (Some(shop), Some(total)) = (&category.best_shop, category.best_total) {
        let _ = writeln!(
            out,
            "Best choice: {} — {}",
            display_shop(shop),
            format_price(total, currency)
        );
    }
}
