// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User store: account records, username uniqueness, balance mutation.
//!
//! ## Security
//!
//! - Password hashes are stored alongside the record but NEVER returned via
//!   API; [`UserResponse`] is the only shape handlers serialize
//! - Balance mutations are single write transactions, so concurrent
//!   adjustments serialize instead of losing updates

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::db::{LedgerDb, StoreError, StoreResult, USERNAME_INDEX, USERS};
use crate::auth::Role;

/// User record as persisted in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub user_id: String,
    /// Unique username, normalized before storage
    pub username: String,
    /// Encoded password hash (scheme, iterations, salt, digest)
    pub password_hash: String,
    /// Role granted to the user
    pub role: Role,
    /// Store-credit balance in minor currency units
    pub balance: u64,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Create a fresh record with a new UUID and a zero balance.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            balance: 0,
            created_at: Utc::now(),
        }
    }
}

/// Response returned to API clients (never includes the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    pub user_id: String,
    /// Username
    pub username: String,
    /// Role granted to the user
    pub role: Role,
    /// Store-credit balance in minor currency units
    pub balance: u64,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
            balance: user.balance,
            created_at: user.created_at,
        }
    }
}

/// Store for user operations on the ledger database.
pub struct UserStore<'a> {
    db: &'a LedgerDb,
}

impl<'a> UserStore<'a> {
    /// Create a new UserStore.
    pub fn new(db: &'a LedgerDb) -> Self {
        Self { db }
    }

    /// Persist a new user.
    ///
    /// The record and its username index entry are written in one
    /// transaction; a taken username fails with `AlreadyExists` and writes
    /// nothing.
    pub fn create(&self, user: &StoredUser) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut index_table = write_txn.open_table(USERNAME_INDEX)?;
            if index_table.get(user.username.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "Username {}",
                    user.username
                )));
            }
            index_table.insert(user.username.as_str(), user.user_id.as_str())?;

            let mut users_table = write_txn.open_table(USERS)?;
            users_table.insert(user.user_id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a user by ID.
    pub fn get(&self, user_id: &str) -> StoreResult<StoredUser> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("User {user_id}"))),
        }
    }

    /// Look up a user by (normalized) username.
    pub fn get_by_username(&self, username: &str) -> StoreResult<StoredUser> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(USERNAME_INDEX)?;
        let user_id = match index_table.get(username)? {
            Some(value) => value.value().to_string(),
            None => return Err(StoreError::NotFound(format!("Username {username}"))),
        };

        let users_table = read_txn.open_table(USERS)?;
        match users_table.get(user_id.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("User {user_id}"))),
        }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: &str) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        Ok(table.get(user_id)?.is_some())
    }

    /// List all users, oldest account first.
    pub fn list_all(&self) -> StoreResult<Vec<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let user: StoredUser = serde_json::from_slice(entry.1.value())?;
            users.push(user);
        }
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(users)
    }

    /// Atomically add `amount` to a user's balance.
    ///
    /// Read-modify-write inside one write transaction; redb serializes write
    /// transactions, so concurrent adjustments can never lose an update.
    pub fn adjust_balance(&self, user_id: &str, amount: u64) -> StoreResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(USERS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(user_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))?;
                existing.value().to_vec()
            };

            let mut user: StoredUser = serde_json::from_slice(&existing_bytes)?;
            user.balance = user
                .balance
                .checked_add(amount)
                .ok_or(StoreError::BalanceOverflow)?;

            let json = serde_json::to_vec(&user)?;
            table.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(updated)
    }
}
