// Parses a product document from the price index into shop quotes
use crate::model::{IndexError, ShopQuote};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<ShopQuote>, IndexError>;
}

pub struct JsonQuoteParser;

impl JsonQuoteParser {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct RawShopPrice {
    shop: Option<String>,
    price: Option<Value>,
    available: Option<bool>,
}

impl Parser for JsonQuoteParser {
    /// Accepts either a product object carrying `shopPrices` or a bare array of entries.
    /// Individual malformed entries are dropped; only an unusable document is an error.
    fn parse(&self, body: &str) -> Result<Vec<ShopQuote>, IndexError> {
        let document: Value =
            serde_json::from_str(body).map_err(|e| IndexError::Malformed(e.to_string()))?;

        let entries = match &document {
            Value::Array(entries) => entries,
            Value::Object(map) => match map.get("shopPrices").or_else(|| map.get("shop_prices")) {
                Some(Value::Array(entries)) => entries,
                Some(Value::Null) => return Ok(Vec::new()),
                _ => return Err(IndexError::Malformed("missing shopPrices array".into())),
            },
            _ => return Err(IndexError::Malformed("expected object or array".into())),
        };

        let mut quotes = Vec::with_capacity(entries.len());
        for entry in entries {
            match parse_entry(entry) {
                Some(quote) => quotes.push(quote),
                None => debug!("Dropping malformed shop price entry: {}", entry),
            }
        }

        Ok(quotes)
    }
}

fn parse_entry(entry: &Value) -> Option<ShopQuote> {
    let raw = RawShopPrice::deserialize(entry).ok()?;
    let shop = raw.shop.filter(|s| !s.trim().is_empty())?;
    let price = parse_price(raw.price.as_ref()?)?;

    Some(ShopQuote::new(shop, price, raw.available.unwrap_or(false)))
}

fn parse_price(value: &Value) -> Option<Decimal> {
    let price = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok()?,
        Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        _ => return None,
    };

    if price.is_sign_negative() {
        return None;
    }
    Some(price)
}
