// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `username_index`: username → user_id (uniqueness + login lookup)
//! - `items`: item_id → serialized StoredItem
//! - `purchases`: purchase_id → serialized StoredPurchase
//! - `buyer_purchase_index`: composite key (buyer_id|timestamp|purchase_id)
//!   → purchase_id, for ascending-time range scans

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadTransaction, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized StoredUser (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: username → user_id. Enforces uniqueness and serves login lookup.
pub(super) const USERNAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("username_index");

/// Catalog table: item_id → serialized StoredItem (JSON bytes).
pub(super) const ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

/// Ledger table: purchase_id → serialized StoredPurchase (JSON bytes).
pub(super) const PURCHASES: TableDefinition<&str, &[u8]> = TableDefinition::new("purchases");

/// Index: composite key → purchase_id.
/// Key format: `buyer_id|timestamp_be|purchase_id` for ascending-time scans.
pub(super) const BUYER_PURCHASE_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("buyer_purchase_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("balance overflow")]
    BalanceOverflow,
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// LedgerDb
// =============================================================================

/// Embedded ACID ledger database.
///
/// Holds the single process-wide redb handle. Entity operations live on the
/// store types in this module ([`super::UserStore`], [`super::ItemStore`],
/// [`super::PurchaseStore`]), which borrow this handle and open transactions
/// through it.
pub struct LedgerDb {
    db: Database,
}

impl LedgerDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(ITEMS)?;
            let _ = write_txn.open_table(PURCHASES)?;
            let _ = write_txn.open_table(BUYER_PURCHASE_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Start a read transaction.
    pub(super) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Start a write transaction. Dropping it without committing aborts.
    pub(super) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap storage probe for readiness checks.
    pub fn health_check(&self) -> bool {
        match self.db.begin_read() {
            Ok(read_txn) => read_txn.open_table(USERS).is_ok(),
            Err(_) => false,
        }
    }
}
