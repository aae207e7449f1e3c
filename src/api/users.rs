// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints: listing, lookup, balances, and the per-user purchase
//! ledger. Balance adjustment is the one admin-gated operation here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    state::AppState,
    storage::{PurchaseResponse, PurchaseStore, StoreError, UserResponse, UserStore},
};

// =============================================================================
// Response Types
// =============================================================================

/// Response listing all user accounts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Users, oldest account first
    pub users: Vec<UserResponse>,
    /// Total number of users
    pub total: usize,
}

/// Response carrying a single user's balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// User the balance belongs to
    pub user_id: String,
    /// Store-credit balance in minor currency units
    pub balance: u64,
}

/// Response listing a user's purchases.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionListResponse {
    /// Purchases, oldest first
    pub transactions: Vec<PurchaseResponse>,
    /// Total number of purchases
    pub total: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// List all user accounts.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All user accounts", body = UserListResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> Result<Json<UserListResponse>, ApiError> {
    tracing::debug!(caller = %caller.user_id, "Listing users");

    let users = UserStore::new(state.db())
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    let total = users.len();
    Ok(Json(UserListResponse { users, total }))
}

/// Fetch a single user by ID.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Auth(_caller): Auth,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserStore::new(state.db()).get(&user_id).map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
        _ => ApiError::internal(format!("Failed to fetch user: {e}")),
    })?;
    Ok(Json(UserResponse::from(user)))
}

/// Add credit to a user's balance (admin only).
///
/// The amount is in minor currency units and is added to the current
/// balance in a single atomic step.
#[utoipa::path(
    patch,
    path = "/users/{user_id}/balance/{amount}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("amount" = u64, Path, description = "Credit to add, in minor currency units")
    ),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Balance adjusted"),
        (status = 400, description = "Adjustment would overflow the balance"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user")
    )
)]
pub async fn adjust_balance(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path((user_id, amount)): Path<(String, u64)>,
) -> Result<StatusCode, ApiError> {
    let updated = UserStore::new(state.db())
        .adjust_balance(&user_id, amount)
        .map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
            StoreError::BalanceOverflow => {
                ApiError::bad_request("Adjustment would overflow the balance")
            }
            _ => ApiError::internal(format!("Failed to adjust balance: {e}")),
        })?;

    tracing::info!(
        admin = %admin.user_id,
        user_id = %updated.user_id,
        amount,
        new_balance = updated.balance,
        "Admin adjusted user balance"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a user's current balance.
#[utoipa::path(
    get,
    path = "/users/{user_id}/balance",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Auth(_caller): Auth,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user = UserStore::new(state.db()).get(&user_id).map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
        _ => ApiError::internal(format!("Failed to fetch user: {e}")),
    })?;
    Ok(Json(BalanceResponse {
        user_id: user.user_id,
        balance: user.balance,
    }))
}

/// List a user's purchases, oldest first.
#[utoipa::path(
    get,
    path = "/users/{user_id}/transactions",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Purchases in creation order", body = TransactionListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Auth(_caller): Auth,
    Path(user_id): Path<String>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let exists = UserStore::new(state.db())
        .exists(&user_id)
        .map_err(|e| ApiError::internal(format!("Failed to fetch user: {e}")))?;
    if !exists {
        return Err(ApiError::not_found(format!("User {user_id} not found")));
    }

    let purchases = PurchaseStore::new(state.db())
        .list_by_buyer(&user_id)
        .map_err(|e| ApiError::internal(format!("Failed to list purchases: {e}")))?;

    let transactions: Vec<PurchaseResponse> =
        purchases.into_iter().map(PurchaseResponse::from).collect();
    let total = transactions.len();
    Ok(Json(TransactionListResponse {
        transactions,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role, TokenService};
    use crate::storage::{ItemStore, LedgerDb, StoredItem, StoredUser};
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = LedgerDb::open(&temp_dir.path().join("test.redb"))
            .expect("Failed to open test database");
        let tokens = TokenService::new(b"users-api-test-secret", "test-issuer", 3600);
        (AppState::new(db, tokens), temp_dir)
    }

    fn seed_user(state: &AppState, username: &str, role: Role, balance: u64) -> StoredUser {
        let store = UserStore::new(state.db());
        let user = StoredUser::new(username, "pbkdf2-sha256$1$AA==$AA==", role);
        store.create(&user).unwrap();
        if balance > 0 {
            store.adjust_balance(&user.user_id, balance).unwrap()
        } else {
            user
        }
    }

    fn authed(user: &StoredUser) -> Auth {
        Auth(AuthenticatedUser {
            user_id: user.user_id.clone(),
            role: user.role,
            expires_at: chrono::Utc::now().timestamp() + 3600,
        })
    }

    fn admin(user: &StoredUser) -> AdminOnly {
        assert!(user.role == Role::Admin, "test seeded a non-admin as admin");
        AdminOnly(AuthenticatedUser {
            user_id: user.user_id.clone(),
            role: user.role,
            expires_at: chrono::Utc::now().timestamp() + 3600,
        })
    }

    #[tokio::test]
    async fn list_users_returns_all_accounts() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 0);
        seed_user(&state, "bob", Role::Standard, 0);

        let Json(body) = list_users(State(state.clone()), authed(&alice)).await.unwrap();
        assert_eq!(body.total, 2);
        let names: Vec<&str> = body.users.iter().map(|u| u.username.as_str()).collect();
        assert!(names.contains(&"alice"));
        assert!(names.contains(&"bob"));
    }

    #[tokio::test]
    async fn get_user_returns_404_for_unknown_id() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 0);

        let err = get_user(
            State(state.clone()),
            authed(&alice),
            Path("no-such-id".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_adjustment_returns_204_and_persists() {
        let (state, _temp_dir) = create_test_state();
        let root = seed_user(&state, "root", Role::Admin, 0);
        let alice = seed_user(&state, "alice", Role::Standard, 100);

        let status = adjust_balance(
            State(state.clone()),
            admin(&root),
            Path((alice.user_id.clone(), 250)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let reread = UserStore::new(state.db()).get(&alice.user_id).unwrap();
        assert_eq!(reread.balance, 350);
    }

    #[tokio::test]
    async fn adjusting_a_missing_user_is_404() {
        let (state, _temp_dir) = create_test_state();
        let root = seed_user(&state, "root", Role::Admin, 0);

        let err = adjust_balance(
            State(state.clone()),
            admin(&root),
            Path(("missing-bob".to_string(), 100)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn adjustment_overflow_is_400_and_changes_nothing() {
        let (state, _temp_dir) = create_test_state();
        let root = seed_user(&state, "root", Role::Admin, 0);
        let rich = seed_user(&state, "rich", Role::Standard, u64::MAX);

        let err = adjust_balance(
            State(state.clone()),
            admin(&root),
            Path((rich.user_id.clone(), 1)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let reread = UserStore::new(state.db()).get(&rich.user_id).unwrap();
        assert_eq!(reread.balance, u64::MAX);
    }

    #[tokio::test]
    async fn balance_endpoint_reflects_adjustments() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 250);

        let Json(body) = get_balance(
            State(state.clone()),
            authed(&alice),
            Path(alice.user_id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(body.user_id, alice.user_id);
        assert_eq!(body.balance, 250);
    }

    #[tokio::test]
    async fn transactions_for_missing_user_is_404() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 0);

        let err = list_transactions(
            State(state.clone()),
            authed(&alice),
            Path("no-such-id".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn transactions_list_is_oldest_first() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 1000);

        let first = StoredItem::new("First", 100);
        let second = StoredItem::new("Second", 200);
        let items = ItemStore::new(state.db());
        items.create(&first).unwrap();
        items.create(&second).unwrap();

        let purchases = PurchaseStore::new(state.db());
        purchases.record(&alice.user_id, &first.item_id).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        purchases.record(&alice.user_id, &second.item_id).unwrap();

        let Json(body) = list_transactions(
            State(state.clone()),
            authed(&alice),
            Path(alice.user_id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(body.total, 2);
        assert_eq!(body.transactions[0].item_id, first.item_id);
        assert_eq!(body.transactions[1].item_id, second.item_id);
    }

    #[tokio::test]
    async fn empty_ledger_lists_zero_transactions() {
        let (state, _temp_dir) = create_test_state();
        let alice = seed_user(&state, "alice", Role::Standard, 0);

        let Json(body) = list_transactions(
            State(state.clone()),
            authed(&alice),
            Path(alice.user_id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(body.total, 0);
        assert!(body.transactions.is_empty());
    }
}
