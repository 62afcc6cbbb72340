// User bag session: basket state, its durable copy, and the latest accepted comparison
use crate::analyzer::Comparator;
use crate::basket::{Basket, BasketSnapshot};
use crate::model::{BasketItem, Comparison};
use crate::storage::SqliteStorage;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

pub struct BagSession {
    basket: Mutex<Basket>,
    storage: Option<Mutex<SqliteStorage>>,
    latest: watch::Sender<Option<Comparison>>,
}

impl BagSession {
    /// Session without durable storage.
    pub fn new(basket: Basket) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            basket: Mutex::new(basket),
            storage: None,
            latest,
        }
    }

    /// Hydrates the basket from storage. A failed load starts from an empty basket.
    pub fn with_storage(storage: SqliteStorage) -> Self {
        let basket = match storage.load_items() {
            Ok(items) => Basket::from_items(items),
            Err(e) => {
                warn!("Failed to load stored bag: {}", e);
                Basket::new()
            }
        };
        info!("Bag hydrated with {} items", basket.len());

        let mut session = Self::new(basket);
        session.storage = Some(Mutex::new(storage));
        session
    }

    pub async fn add(&self, item: BasketItem) -> bool {
        let mut basket = self.basket.lock().await;
        if !basket.add(item.clone()) {
            return false;
        }
        self.persist(|s| s.save_item(&item).map(|_| ())).await;
        self.invalidate(basket.revision());
        true
    }

    pub async fn remove(&self, sku: &str) -> bool {
        let mut basket = self.basket.lock().await;
        if !basket.remove(sku) {
            return false;
        }
        self.persist(|s| s.remove_item(sku).map(|_| ())).await;
        self.invalidate(basket.revision());
        true
    }

    pub async fn clear(&self) -> bool {
        let mut basket = self.basket.lock().await;
        if !basket.clear() {
            return false;
        }
        self.persist(|s| s.clear()).await;
        self.invalidate(basket.revision());
        true
    }

    pub async fn contains(&self, sku: &str) -> bool {
        self.basket.lock().await.contains(sku)
    }

    pub async fn snapshot(&self) -> BasketSnapshot {
        self.basket.lock().await.snapshot()
    }

    /// Accepts `comparison` only if it was computed from the current basket revision.
    pub async fn publish(&self, comparison: Comparison) -> bool {
        let basket = self.basket.lock().await;
        if comparison.revision != basket.revision() {
            debug!(
                "Discarding stale comparison (revision {}, current {})",
                comparison.revision,
                basket.revision()
            );
            return false;
        }
        self.latest.send_replace(Some(comparison));
        true
    }

    pub async fn refresh(&self, comparator: &Comparator) -> bool {
        let snapshot = self.snapshot().await;
        let comparison = comparator.compare(&snapshot).await;
        self.publish(comparison).await
    }

    pub fn latest(&self) -> Option<Comparison> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Comparison>> {
        self.latest.subscribe()
    }

    fn invalidate(&self, revision: u64) {
        debug!("Bag changed (revision {}), dropping previous comparison", revision);
        self.latest.send_replace(None);
    }

    async fn persist<F>(&self, op: F)
    where
        F: FnOnce(&SqliteStorage) -> Result<(), crate::model::StorageError>,
    {
        if let Some(storage) = &self.storage {
            if let Err(e) = op(&*storage.lock().await) {
                warn!("Bag storage error: {}", e);
            }
        }
    }
}
