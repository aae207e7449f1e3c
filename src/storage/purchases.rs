// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Purchase store: the immutable purchase ledger.
//!
//! A purchase deducts the item's price from the buyer's balance and records
//! the event, all inside one write transaction. Either both happen or
//! neither does; a purchase row with no matching deduction (or the reverse)
//! cannot exist.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::db::{LedgerDb, StoreError, StoreResult, BUYER_PURCHASE_INDEX, ITEMS, PURCHASES, USERS};
use super::items::StoredItem;
use super::users::StoredUser;

/// Purchase record as persisted in the `purchases` table.
///
/// Immutable once created; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPurchase {
    /// Unique purchase identifier (UUID)
    pub purchase_id: String,
    /// Item that was bought
    pub item_id: String,
    /// User who bought it
    pub buyer_id: String,
    /// Amount deducted, snapshotted from the item price at purchase time
    pub price: u64,
    /// When the purchase happened
    pub created_at: DateTime<Utc>,
}

/// Response returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    /// Unique purchase identifier
    pub purchase_id: String,
    /// Item that was bought
    pub item_id: String,
    /// User who bought it
    pub buyer_id: String,
    /// Amount deducted at purchase time
    pub price: u64,
    /// When the purchase happened
    pub created_at: DateTime<Utc>,
}

impl From<StoredPurchase> for PurchaseResponse {
    fn from(purchase: StoredPurchase) -> Self {
        Self {
            purchase_id: purchase.purchase_id,
            item_id: purchase.item_id,
            buyer_id: purchase.buyer_id,
            price: purchase.price,
            created_at: purchase.created_at,
        }
    }
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the buyer_purchase_index table.
///
/// Format: `buyer_id | timestamp_be_bytes | purchase_id`
///
/// The plain big-endian timestamp gives oldest-first ordering when scanning
/// forward; the purchase_id suffix keeps keys unique within a microsecond.
fn make_index_key(buyer_id: &str, timestamp_micros: i64, purchase_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(buyer_id.len() + 1 + 8 + 1 + purchase_id.len());
    key.extend_from_slice(buyer_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(timestamp_micros as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(purchase_id.as_bytes());
    key
}

/// Build a prefix key for range scanning all purchases of a buyer.
fn make_prefix(buyer_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(buyer_id.len() + 1);
    prefix.extend_from_slice(buyer_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with all 0xFF bytes appended).
fn make_prefix_end(buyer_id: &str) -> Vec<u8> {
    let mut end = Vec::with_capacity(buyer_id.len() + 1 + 20);
    end.extend_from_slice(buyer_id.as_bytes());
    end.push(b'|');
    // Append enough 0xFF bytes to be past any valid key with this prefix
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// PurchaseStore
// =============================================================================

/// Store for ledger operations on the ledger database.
pub struct PurchaseStore<'a> {
    db: &'a LedgerDb,
}

impl<'a> PurchaseStore<'a> {
    /// Create a new PurchaseStore.
    pub fn new(db: &'a LedgerDb) -> Self {
        Self { db }
    }

    /// Record a purchase: deduct the item price from the buyer's balance and
    /// persist the purchase row plus its index entry.
    ///
    /// Runs in a single write transaction. Any failure (missing item,
    /// missing buyer, insufficient balance) aborts the whole transaction and
    /// leaves the ledger and the balance untouched.
    pub fn record(&self, buyer_id: &str, item_id: &str) -> StoreResult<StoredPurchase> {
        let write_txn = self.db.begin_write()?;
        let purchase = {
            // Snapshot the item price inside the transaction
            let items_table = write_txn.open_table(ITEMS)?;
            let item_bytes = {
                let value = items_table
                    .get(item_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Item {item_id}")))?;
                value.value().to_vec()
            };
            let item: StoredItem = serde_json::from_slice(&item_bytes)?;

            // Deduct from the buyer
            let mut users_table = write_txn.open_table(USERS)?;
            let buyer_bytes = {
                let value = users_table
                    .get(buyer_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("User {buyer_id}")))?;
                value.value().to_vec()
            };
            let mut buyer: StoredUser = serde_json::from_slice(&buyer_bytes)?;

            let available = buyer.balance;
            buyer.balance = available
                .checked_sub(item.price)
                .ok_or(StoreError::InsufficientBalance {
                    available,
                    required: item.price,
                })?;
            let buyer_json = serde_json::to_vec(&buyer)?;
            users_table.insert(buyer_id, buyer_json.as_slice())?;

            // Persist the purchase and its index entry
            let purchase = StoredPurchase {
                purchase_id: Uuid::new_v4().to_string(),
                item_id: item.item_id,
                buyer_id: buyer_id.to_string(),
                price: item.price,
                created_at: Utc::now(),
            };
            let purchase_json = serde_json::to_vec(&purchase)?;

            let mut purchases_table = write_txn.open_table(PURCHASES)?;
            purchases_table.insert(purchase.purchase_id.as_str(), purchase_json.as_slice())?;

            let mut idx_table = write_txn.open_table(BUYER_PURCHASE_INDEX)?;
            let key = make_index_key(
                buyer_id,
                purchase.created_at.timestamp_micros(),
                &purchase.purchase_id,
            );
            idx_table.insert(key.as_slice(), purchase.purchase_id.as_str())?;

            purchase
        };
        write_txn.commit()?;
        Ok(purchase)
    }

    /// Look up a single purchase by ID.
    pub fn get(&self, purchase_id: &str) -> StoreResult<StoredPurchase> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PURCHASES)?;
        match table.get(purchase_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Purchase {purchase_id}"))),
        }
    }

    /// List a buyer's purchases, oldest first.
    ///
    /// Scans the composite index forward, so results come back in creation
    /// order without an explicit sort.
    pub fn list_by_buyer(&self, buyer_id: &str) -> StoreResult<Vec<StoredPurchase>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(BUYER_PURCHASE_INDEX)?;
        let purchases_table = read_txn.open_table(PURCHASES)?;

        let prefix = make_prefix(buyer_id);
        let prefix_end = make_prefix_end(buyer_id);

        let mut results = Vec::new();
        let range = idx_table.range(prefix.as_slice()..prefix_end.as_slice())?;
        for entry in range {
            let entry = entry?;
            let purchase_id = entry.1.value().to_string();
            if let Some(value) = purchases_table.get(purchase_id.as_str())? {
                let purchase: StoredPurchase = serde_json::from_slice(value.value())?;
                results.push(purchase);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::storage::{ItemStore, UserStore};

    fn temp_db() -> (LedgerDb, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn funded_user(db: &LedgerDb, username: &str, balance: u64) -> StoredUser {
        let store = UserStore::new(db);
        let user = StoredUser::new(username, "pbkdf2-sha256$1$AA==$AA==", Role::Standard);
        store.create(&user).unwrap();
        if balance > 0 {
            store.adjust_balance(&user.user_id, balance).unwrap()
        } else {
            user
        }
    }

    fn catalog_item(db: &LedgerDb, name: &str, price: u64) -> StoredItem {
        let item = StoredItem::new(name, price);
        ItemStore::new(db).create(&item).unwrap();
        item
    }

    #[test]
    fn record_deducts_balance_and_persists_purchase() {
        let (db, _dir) = temp_db();
        let buyer = funded_user(&db, "alice", 500);
        let item = catalog_item(&db, "Espresso", 350);

        let store = PurchaseStore::new(&db);
        let purchase = store.record(&buyer.user_id, &item.item_id).unwrap();
        assert_eq!(purchase.price, 350);
        assert_eq!(purchase.buyer_id, buyer.user_id);
        assert_eq!(purchase.item_id, item.item_id);

        let balance_after = UserStore::new(&db).get(&buyer.user_id).unwrap().balance;
        assert_eq!(balance_after, 150);

        let reread = store.get(&purchase.purchase_id).unwrap();
        assert_eq!(reread.price, 350);
    }

    #[test]
    fn insufficient_balance_leaves_everything_untouched() {
        let (db, _dir) = temp_db();
        let buyer = funded_user(&db, "bob", 100);
        let item = catalog_item(&db, "Espresso", 350);

        let store = PurchaseStore::new(&db);
        let result = store.record(&buyer.user_id, &item.item_id);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientBalance {
                available: 100,
                required: 350
            })
        ));

        // Balance unchanged, no ledger rows
        assert_eq!(UserStore::new(&db).get(&buyer.user_id).unwrap().balance, 100);
        assert!(store.list_by_buyer(&buyer.user_id).unwrap().is_empty());
    }

    #[test]
    fn exact_balance_is_spendable_to_zero() {
        let (db, _dir) = temp_db();
        let buyer = funded_user(&db, "carol", 350);
        let item = catalog_item(&db, "Espresso", 350);

        PurchaseStore::new(&db)
            .record(&buyer.user_id, &item.item_id)
            .unwrap();
        assert_eq!(UserStore::new(&db).get(&buyer.user_id).unwrap().balance, 0);
    }

    #[test]
    fn missing_item_or_buyer_is_not_found() {
        let (db, _dir) = temp_db();
        let buyer = funded_user(&db, "dave", 500);
        let item = catalog_item(&db, "Espresso", 350);

        let store = PurchaseStore::new(&db);
        assert!(matches!(
            store.record(&buyer.user_id, "no-such-item"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.record("no-such-user", &item.item_id),
            Err(StoreError::NotFound(_))
        ));

        // Balance untouched by either failure
        assert_eq!(UserStore::new(&db).get(&buyer.user_id).unwrap().balance, 500);
    }

    #[test]
    fn list_by_buyer_is_oldest_first() {
        let (db, _dir) = temp_db();
        let buyer = funded_user(&db, "erin", 1000);
        let first = catalog_item(&db, "First", 100);
        let second = catalog_item(&db, "Second", 200);
        let third = catalog_item(&db, "Third", 300);

        let store = PurchaseStore::new(&db);
        for item in [&first, &second, &third] {
            store.record(&buyer.user_id, &item.item_id).unwrap();
            // Distinct creation timestamps for a deterministic scan order
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let purchases = store.list_by_buyer(&buyer.user_id).unwrap();
        let item_ids: Vec<&str> = purchases.iter().map(|p| p.item_id.as_str()).collect();
        assert_eq!(item_ids, vec![&first.item_id, &second.item_id, &third.item_id]);

        // Creation times are non-decreasing
        for pair in purchases.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn list_by_buyer_excludes_other_buyers() {
        let (db, _dir) = temp_db();
        let alice = funded_user(&db, "alice", 500);
        let bob = funded_user(&db, "bob", 500);
        let item = catalog_item(&db, "Espresso", 100);

        let store = PurchaseStore::new(&db);
        store.record(&alice.user_id, &item.item_id).unwrap();
        store.record(&alice.user_id, &item.item_id).unwrap();
        store.record(&bob.user_id, &item.item_id).unwrap();

        assert_eq!(store.list_by_buyer(&alice.user_id).unwrap().len(), 2);
        assert_eq!(store.list_by_buyer(&bob.user_id).unwrap().len(), 1);
    }

    #[test]
    fn make_index_key_ordering() {
        // Older timestamps should produce smaller composite keys (ascending)
        let key_old = make_index_key("buyer-1", 1_000_000, "p1");
        let key_new = make_index_key("buyer-1", 2_000_000, "p2");
        assert!(key_old < key_new, "Older timestamps should sort first");
    }
}
