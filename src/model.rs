// Core structs: BasketItem, ShopQuote, ShopTotal, CategoryResult
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Product catalog an item belongs to. Each domain is priced by its own index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "para", alias = "parapharmacy")]
    Para,
    #[serde(rename = "retail")]
    Retail,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Para, Domain::Retail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Para => "para",
            Domain::Retail => "retail",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Para => "Parapharmacie",
            Domain::Retail => "Électronique",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown domain '{0}' (expected 'para' or 'retail')")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "para" | "parapharmacy" => Ok(Domain::Para),
            "retail" => Ok(Domain::Retail),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub sku: String,
    pub domain: Domain,
    #[serde(default)]
    pub title: String,
}

impl BasketItem {
    pub fn new(sku: impl Into<String>, domain: Domain) -> Self {
        Self {
            sku: sku.into(),
            domain,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// One shop's price/availability answer for one item. `shop` is canonical (see `normalizer`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopQuote {
    pub shop: String,
    pub price: Decimal,
    pub available: bool,
}

impl ShopQuote {
    pub fn new(shop: impl Into<String>, price: Decimal, available: bool) -> Self {
        Self {
            shop: shop.into(),
            price,
            available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopTotal {
    pub shop: String,
    pub total: Decimal,
    pub available_count: usize,
    pub missing_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    pub category: Domain,
    pub category_label: String,
    pub best_shop: Option<String>,
    pub best_total: Option<Decimal>,
    pub shop_totals: Vec<ShopTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BestShopResult {
    pub para_result: Option<CategoryResult>,
    pub retail_result: Option<CategoryResult>,
}

impl BestShopResult {
    pub fn get(&self, domain: Domain) -> Option<&CategoryResult> {
        match domain {
            Domain::Para => self.para_result.as_ref(),
            Domain::Retail => self.retail_result.as_ref(),
        }
    }

    /// True when no present domain has any shop data.
    pub fn has_no_shop_data(&self) -> bool {
        Domain::ALL
            .iter()
            .filter_map(|d| self.get(*d))
            .all(|c| c.shop_totals.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonStatus {
    Complete,
    Partial { failed_lookups: usize },
    IndexUnavailable,
}

/// A best-shop result tagged with the basket revision it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub revision: u64,
    pub status: ComparisonStatus,
    pub result: BestShopResult,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    InvalidResponse(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}
