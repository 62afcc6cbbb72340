// Analyzer module: pure best-shop aggregation and the async comparator driving it.

pub mod best_shop;
pub mod comparator;

// Re-export the main entry points for ease of use.
pub use best_shop::{BestShopPolicy, QuotedItem, compute_best_shop};
pub use comparator::Comparator;
