// Client-local bag of selected items, unique by sku
use crate::model::BasketItem;

#[derive(Debug, Clone, Default)]
pub struct Basket {
    items: Vec<BasketItem>,
    revision: u64,
}

/// Immutable view of the basket taken at the start of a comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketSnapshot {
    pub revision: u64,
    pub items: Vec<BasketItem>,
}

impl BasketSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates a basket from persisted items; later duplicates of a sku are dropped.
    pub fn from_items(items: impl IntoIterator<Item = BasketItem>) -> Self {
        let mut basket = Self::new();
        for item in items {
            basket.add(item);
        }
        basket.revision = 0;
        basket
    }

    /// Returns false when an item with the same sku is already present.
    pub fn add(&mut self, item: BasketItem) -> bool {
        if self.contains(&item.sku) {
            return false;
        }
        self.items.push(item);
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, sku: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.sku != sku);
        let removed = self.items.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        self.revision += 1;
        true
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.items.iter().any(|i| i.sku == sku)
    }

    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bumped by every mutation that changes the contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> BasketSnapshot {
        BasketSnapshot {
            revision: self.revision,
            items: self.items.clone(),
        }
    }
}
