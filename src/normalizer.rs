use crate::model::ShopQuote;

/// Canonical form of a shop identifier: trimmed and lower-cased.
pub fn normalize_shop(shop: &str) -> String {
    shop.trim().to_lowercase()
}

/// Canonicalises shop names and keeps one quote per shop.
/// An available quote beats an unavailable one, then the lower price wins.
pub fn normalize_all(quotes: Vec<ShopQuote>) -> Vec<ShopQuote> {
    let mut result: Vec<ShopQuote> = Vec::with_capacity(quotes.len());

    for mut quote in quotes {
        quote.shop = normalize_shop(&quote.shop);
        if quote.shop.is_empty() {
            continue;
        }

        match result.iter_mut().find(|q| q.shop == quote.shop) {
            Some(existing) => {
                if is_better(&quote, existing) {
                    *existing = quote;
                }
            }
            None => result.push(quote),
        }
    }

    result
}

fn is_better(candidate: &ShopQuote, current: &ShopQuote) -> bool {
    match (candidate.available, current.available) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.price < current.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn shop_names_are_canonical() {
        assert_eq!(normalize_shop("  Pharma-Shop "), "pharma-shop");
        assert_eq!(normalize_shop("MYTEK"), "mytek");
    }

    #[test]
    fn duplicate_shops_collapse() {
        let quotes = vec![
            ShopQuote::new("Mytek", Decimal::new(900, 1), false),
            ShopQuote::new("mytek ", Decimal::new(1000, 1), true),
            ShopQuote::new("MYTEK", Decimal::new(950, 1), true),
            ShopQuote::new("Tunisianet", Decimal::new(800, 1), true),
            ShopQuote::new("   ", Decimal::ONE, true),
        ];
        let normalized = normalize_all(quotes);
        assert_eq!(
            normalized,
            vec![
                ShopQuote::new("mytek", Decimal::new(950, 1), true),
                ShopQuote::new("tunisianet", Decimal::new(800, 1), true),
            ]
        );
    }
}
