use crate::model::{BasketItem, BestShopResult, CategoryResult, Domain, ShopQuote, ShopTotal};
use crate::normalizer::normalize_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

/// How the best shop of a category is chosen among shops with at least one available item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestShopPolicy {
    /// Fewest missing items first, then lowest total, then shop name.
    #[default]
    FullestCoverage,
    /// Lowest total first, then most available items, then shop name.
    CheapestTotal,
}

impl BestShopPolicy {
    fn compare(&self, a: &ShopTotal, b: &ShopTotal) -> Ordering {
        let primary = match self {
            BestShopPolicy::FullestCoverage => a
                .missing_count
                .cmp(&b.missing_count)
                .then_with(|| a.total.cmp(&b.total)),
            BestShopPolicy::CheapestTotal => a
                .total
                .cmp(&b.total)
                .then_with(|| b.available_count.cmp(&a.available_count)),
        };
        primary.then_with(|| a.shop.cmp(&b.shop))
    }
}

/// A basket item together with whatever the price index returned for it.
/// Items whose lookup failed carry no quotes.
#[derive(Debug, Clone, Copy)]
pub struct QuotedItem<'a> {
    pub item: &'a BasketItem,
    pub quotes: &'a [ShopQuote],
}

/// Builds one result per domain present in `items`; absent domains stay `None`.
pub fn compute_best_shop(items: &[QuotedItem<'_>], policy: BestShopPolicy) -> BestShopResult {
    let mut result = BestShopResult::default();

    for domain in Domain::ALL {
        let partition: Vec<QuotedItem<'_>> = items
            .iter()
            .filter(|q| q.item.domain == domain)
            .copied()
            .collect();
        if partition.is_empty() {
            continue;
        }

        let category = compute_category(domain, &partition, policy);
        match domain {
            Domain::Para => result.para_result = Some(category),
            Domain::Retail => result.retail_result = Some(category),
        }
    }

    result
}

/// Per-shop totals over one domain's items. `shop_totals` holds only shops with at
/// least one available item, cheapest first.
pub fn compute_category(
    domain: Domain,
    partition: &[QuotedItem<'_>],
    policy: BestShopPolicy,
) -> CategoryResult {
    let partition_size = partition.len();
    let mut per_shop: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for quoted in partition {
        for quote in normalize_all(quoted.quotes.to_vec()) {
            let entry = per_shop.entry(quote.shop.clone()).or_insert((Decimal::ZERO, 0));
            if quote.available {
                entry.0 = match entry.0.checked_add(quote.price) {
                    Some(sum) => sum,
                    None => {
                        warn!("Total for {} overflowed, capping at the largest price", quote.shop);
                        Decimal::MAX
                    }
                };
                entry.1 += 1;
            }
        }
    }

    let mut shop_totals: Vec<ShopTotal> = per_shop
        .into_iter()
        .filter(|(_, (_, available))| *available > 0)
        .map(|(shop, (total, available_count))| ShopTotal {
            shop,
            total,
            available_count,
            missing_count: partition_size - available_count,
        })
        .collect();

    shop_totals.sort_by(|a, b| a.total.cmp(&b.total).then_with(|| a.shop.cmp(&b.shop)));

    let best = shop_totals.iter().min_by(|a, b| policy.compare(a, b));

    CategoryResult {
        category: domain,
        category_label: domain.label().to_string(),
        best_shop: best.map(|b| b.shop.clone()),
        best_total: best.map(|b| b.total),
        shop_totals,
    }
}
