// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item store: the purchasable catalog.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::db::{LedgerDb, StoreError, StoreResult, ITEMS};

/// Item record as persisted in the `items` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    /// Unique item identifier (UUID)
    pub item_id: String,
    /// Display name
    pub name: String,
    /// Price in minor currency units, snapshotted into purchases
    pub price: u64,
    /// When the item was added to the catalog
    pub created_at: DateTime<Utc>,
}

impl StoredItem {
    /// Create a fresh record with a new UUID.
    pub fn new(name: impl Into<String>, price: u64) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            name: name.into(),
            price,
            created_at: Utc::now(),
        }
    }
}

/// Response returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    /// Unique item identifier
    pub item_id: String,
    /// Display name
    pub name: String,
    /// Price in minor currency units
    pub price: u64,
    /// When the item was added to the catalog
    pub created_at: DateTime<Utc>,
}

impl From<StoredItem> for ItemResponse {
    fn from(item: StoredItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name,
            price: item.price,
            created_at: item.created_at,
        }
    }
}

/// Store for catalog operations on the ledger database.
pub struct ItemStore<'a> {
    db: &'a LedgerDb,
}

impl<'a> ItemStore<'a> {
    /// Create a new ItemStore.
    pub fn new(db: &'a LedgerDb) -> Self {
        Self { db }
    }

    /// Persist a new catalog item.
    pub fn create(&self, item: &StoredItem) -> StoreResult<()> {
        let json = serde_json::to_vec(item)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ITEMS)?;
            table.insert(item.item_id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up an item by ID.
    pub fn get(&self, item_id: &str) -> StoreResult<StoredItem> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS)?;
        match table.get(item_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Item {item_id}"))),
        }
    }

    /// List the whole catalog, oldest item first.
    pub fn list_all(&self) -> StoreResult<Vec<StoredItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS)?;

        let mut items = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let item: StoredItem = serde_json::from_slice(entry.1.value())?;
            items.push(item);
        }
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (LedgerDb, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn create_and_get_round_trips() {
        let (db, _dir) = temp_db();
        let store = ItemStore::new(&db);

        let item = StoredItem::new("Espresso", 350);
        store.create(&item).unwrap();

        let retrieved = store.get(&item.item_id).unwrap();
        assert_eq!(retrieved.name, "Espresso");
        assert_eq!(retrieved.price, 350);
    }

    #[test]
    fn get_missing_item_is_not_found() {
        let (db, _dir) = temp_db();
        let store = ItemStore::new(&db);

        let result = store.get("no-such-item");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_all_returns_oldest_first() {
        let (db, _dir) = temp_db();
        let store = ItemStore::new(&db);

        let mut old = StoredItem::new("Old", 100);
        old.created_at = Utc::now() - chrono::Duration::seconds(60);
        let new = StoredItem::new("New", 200);

        store.create(&new).unwrap();
        store.create(&old).unwrap();

        let all = store.list_all().unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Old", "New"]);
    }

    #[test]
    fn zero_price_items_are_allowed() {
        let (db, _dir) = temp_db();
        let store = ItemStore::new(&db);

        let freebie = StoredItem::new("Sticker", 0);
        store.create(&freebie).unwrap();
        assert_eq!(store.get(&freebie.item_id).unwrap().price, 0);
    }
}
