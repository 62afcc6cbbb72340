use crate::analyzer::best_shop::{BestShopPolicy, QuotedItem, compute_best_shop};
use crate::basket::BasketSnapshot;
use crate::index::PriceIndex;
use crate::model::{BestShopResult, Comparison, ComparisonStatus, ShopQuote};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches quotes for a basket snapshot and aggregates them per domain.
/// Lookup failures never abort a run: the affected item simply has no quotes.
#[derive(Clone)]
pub struct Comparator {
    index: Arc<dyn PriceIndex>,
    policy: BestShopPolicy,
}

impl Comparator {
    pub fn new(index: Arc<dyn PriceIndex>, policy: BestShopPolicy) -> Self {
        Self { index, policy }
    }

    pub async fn compare(&self, snapshot: &BasketSnapshot) -> Comparison {
        if snapshot.is_empty() {
            return Comparison {
                revision: snapshot.revision,
                status: ComparisonStatus::Complete,
                result: BestShopResult::default(),
            };
        }

        info!(
            "Comparing {} items (revision {})...",
            snapshot.items.len(),
            snapshot.revision
        );
        let lookups = self.index.fetch_all(&snapshot.items).await;

        let mut failed = 0;
        let quotes: Vec<Vec<ShopQuote>> = snapshot
            .items
            .iter()
            .zip(lookups)
            .map(|(item, lookup)| match lookup {
                Ok(quotes) => quotes,
                Err(e) => {
                    warn!("Quote lookup failed for {} ({}): {}", item.sku, item.domain, e);
                    failed += 1;
                    Vec::new()
                }
            })
            .collect();

        let quoted: Vec<QuotedItem<'_>> = snapshot
            .items
            .iter()
            .zip(&quotes)
            .map(|(item, quotes)| QuotedItem { item, quotes })
            .collect();
        let result = compute_best_shop(&quoted, self.policy);

        let status = if failed == 0 {
            ComparisonStatus::Complete
        } else if failed == snapshot.items.len() {
            warn!("Price index unavailable for every item of revision {}", snapshot.revision);
            ComparisonStatus::IndexUnavailable
        } else {
            ComparisonStatus::Partial {
                failed_lookups: failed,
            }
        };

        for category in [&result.para_result, &result.retail_result].into_iter().flatten() {
            match (&category.best_shop, category.best_total) {
                (Some(shop), Some(total)) => info!(
                    "Best shop for {}: {} at {} ({} shops compared)",
                    category.category,
                    shop,
                    total,
                    category.shop_totals.len()
                ),
                _ => info!("No shop data for {}", category.category),
            }
        }

        Comparison {
            revision: snapshot.revision,
            status,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::Basket;
    use crate::model::{BasketItem, Domain, IndexError};
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory index keyed by sku. Unknown skus fail with a timeout.
    #[derive(Default)]
    struct FakeIndex {
        quotes: HashMap<String, Vec<ShopQuote>>,
        calls: AtomicUsize,
    }

    impl FakeIndex {
        fn with(mut self, sku: &str, quotes: &[(&str, i64, bool)]) -> Self {
            self.quotes.insert(
                sku.to_string(),
                quotes
                    .iter()
                    .map(|(shop, price, available)| ShopQuote::new(*shop, Decimal::from(*price), *available))
                    .collect(),
            );
            self
        }
    }

    #[async_trait::async_trait]
    impl PriceIndex for FakeIndex {
        async fn fetch_quotes(&self, item: &BasketItem) -> Result<Vec<ShopQuote>, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quotes.get(&item.sku).cloned().ok_or(IndexError::Timeout)
        }
    }

    fn basket(items: &[(&str, Domain)]) -> Basket {
        Basket::from_items(items.iter().map(|(sku, domain)| BasketItem::new(*sku, *domain)))
    }

    #[tokio::test]
    async fn empty_basket_skips_lookups() {
        let index = Arc::new(FakeIndex::default());
        let comparator = Comparator::new(index.clone(), BestShopPolicy::default());

        let comparison = comparator.compare(&Basket::new().snapshot()).await;
        assert_eq!(comparison.status, ComparisonStatus::Complete);
        assert!(comparison.result.para_result.is_none());
        assert!(comparison.result.retail_result.is_none());
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn diagnostic_scenario_recommends_full_coverage() {
        let index = FakeIndex::default()
            .with("A", &[("ShopX", 10, true), ("ShopY", 12, true)])
            .with("B", &[("ShopX", 5, true), ("ShopY", 6, false)]);
        let comparator = Comparator::new(Arc::new(index), BestShopPolicy::FullestCoverage);

        let comparison = comparator
            .compare(&basket(&[("A", Domain::Retail), ("B", Domain::Retail)]).snapshot())
            .await;
        let retail = comparison.result.retail_result.unwrap();
        assert_eq!(retail.best_shop.as_deref(), Some("shopx"));
        assert_eq!(retail.best_total, Some(Decimal::from(15)));
        assert_eq!(comparison.status, ComparisonStatus::Complete);
    }

    #[tokio::test]
    async fn partial_failures_are_reported_not_raised() {
        let index = FakeIndex::default().with("A", &[("x", 4, true)]);
        let comparator = Comparator::new(Arc::new(index), BestShopPolicy::default());

        let comparison = comparator
            .compare(&basket(&[("A", Domain::Para), ("B", Domain::Para)]).snapshot())
            .await;
        assert_eq!(comparison.status, ComparisonStatus::Partial { failed_lookups: 1 });
        let para = comparison.result.para_result.unwrap();
        assert_eq!(para.shop_totals.len(), 1);
        assert_eq!(para.shop_totals[0].missing_count, 1);
    }

    #[tokio::test]
    async fn total_outage_collapses_to_no_shop_data() {
        let comparator = Comparator::new(Arc::new(FakeIndex::default()), BestShopPolicy::default());

        let comparison = comparator
            .compare(&basket(&[("A", Domain::Para), ("B", Domain::Retail)]).snapshot())
            .await;
        assert_eq!(comparison.status, ComparisonStatus::IndexUnavailable);
        let para = comparison.result.para_result.as_ref().unwrap();
        let retail = comparison.result.retail_result.as_ref().unwrap();
        assert!(para.shop_totals.is_empty() && para.best_shop.is_none());
        assert!(retail.shop_totals.is_empty() && retail.best_shop.is_none());
    }

    #[tokio::test]
    async fn comparison_carries_snapshot_revision() {
        let index = FakeIndex::default().with("A", &[("x", 1, true)]);
        let comparator = Comparator::new(Arc::new(index), BestShopPolicy::default());
        let mut basket = Basket::new();
        basket.add(BasketItem::new("A", Domain::Retail));
        basket.add(BasketItem::new("B", Domain::Retail));
        basket.remove("B");

        let comparison = comparator.compare(&basket.snapshot()).await;
        assert_eq!(comparison.revision, 3);
    }
}
