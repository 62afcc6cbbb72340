use crate::model::{BasketItem, Domain, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::warn;

/// Durable copy of the bag, so it survives restarts.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and creates the schema if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS bag_items (
                sku TEXT PRIMARY KEY,
                domain TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                added_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Stored items in insertion order. Rows that no longer decode are skipped.
    pub fn load_items(&self) -> Result<Vec<BasketItem>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT sku, domain, title, added_at FROM bag_items ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (sku, domain, title, added_at) = row?;
            match Self::map_item(sku, &domain, title, &added_at) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping stored bag item: {}", e),
            }
        }

        Ok(items)
    }

    fn map_item(
        sku: String,
        domain: &str,
        title: String,
        added_at: &str,
    ) -> Result<BasketItem, StorageError> {
        let domain: Domain = domain
            .parse()
            .map_err(|e| StorageError::InvalidRow(format!("{}: {}", sku, e)))?;
        DateTime::parse_from_rfc3339(added_at)
            .map_err(|e| StorageError::InvalidRow(format!("{}: bad added_at: {}", sku, e)))?;
        Ok(BasketItem { sku, domain, title })
    }

    /// Returns false when the sku was already stored.
    pub fn save_item(&self, item: &BasketItem) -> Result<bool, StorageError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO bag_items (sku, domain, title, added_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                &item.sku,
                item.domain.as_str(),
                &item.title,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn remove_item(&self, sku: &str) -> Result<bool, StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM bag_items WHERE sku = ?1", params![sku])?;
        Ok(removed > 0)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM bag_items", [])?;
        Ok(())
    }
}
