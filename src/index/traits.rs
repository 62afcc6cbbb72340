use crate::model::{BasketItem, IndexError, ShopQuote};
use futures::future::join_all;

#[async_trait::async_trait]
pub trait PriceIndex: Send + Sync {
    /// Quotes for one item, with canonical shop names.
    async fn fetch_quotes(&self, item: &BasketItem) -> Result<Vec<ShopQuote>, IndexError>;

    /// One result per item, in input order. Lookups run concurrently.
    async fn fetch_all(&self, items: &[BasketItem]) -> Vec<Result<Vec<ShopQuote>, IndexError>> {
        join_all(items.iter().map(|item| self.fetch_quotes(item))).await
    }
}
