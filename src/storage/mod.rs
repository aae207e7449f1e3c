// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Storage Module
//!
//! This module provides persistent storage using **redb**, an embedded
//! pure-Rust ACID database. A single database file holds every table; entity
//! stores borrow the shared [`LedgerDb`] handle and run their operations in
//! redb transactions.
//!
//! ## Consistency Model
//!
//! - Every mutation is one write transaction: committed fully or not at all
//! - Write transactions serialize, so balance read-modify-write cycles
//!   cannot lose updates under concurrency
//! - Reads run on consistent snapshots
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/ledger.redb
//!   users                  # user_id → StoredUser (JSON)
//!   username_index         # username → user_id
//!   items                  # item_id → StoredItem (JSON)
//!   purchases              # purchase_id → StoredPurchase (JSON)
//!   buyer_purchase_index   # buyer_id|timestamp|purchase_id → purchase_id
//! ```

pub mod db;
pub mod items;
pub mod purchases;
pub mod users;

pub use db::{LedgerDb, StoreError, StoreResult};
pub use items::{ItemResponse, ItemStore, StoredItem};
pub use purchases::{PurchaseResponse, PurchaseStore, StoredPurchase};
pub use users::{StoredUser, UserResponse, UserStore};
