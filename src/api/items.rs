// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item endpoints: the purchasable catalog and the purchase operation
//! itself. Catalog writes are admin-gated; buying is open to any
//! authenticated user with enough balance.

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
    storage::{ItemResponse, ItemStore, PurchaseResponse, PurchaseStore, StoreError, StoredItem},
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to add an item to the catalog.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Display name of the item
    pub name: String,
    /// Price in minor currency units
    pub price: u64,
}

/// Response listing the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemListResponse {
    /// Items, oldest first
    pub items: Vec<ItemResponse>,
    /// Total number of items
    pub total: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// List the item catalog.
#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All catalog items", body = ItemListResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Auth(_caller): Auth,
) -> Result<Json<ItemListResponse>, ApiError> {
    let items = ItemStore::new(state.db())
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list items: {e}")))?;

    let items: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
    let total = items.len();
    Ok(Json(ItemListResponse { items, total }))
}

/// Add an item to the catalog (admin only).
#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    request_body = CreateItemRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Empty item name"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Item name must not be empty"));
    }

    let item = StoredItem::new(name, request.price);
    ItemStore::new(state.db())
        .create(&item)
        .map_err(|e| ApiError::internal(format!("Failed to create item: {e}")))?;

    tracing::info!(
        admin = %admin.user_id,
        item_id = %item.item_id,
        price = item.price,
        "Catalog item created"
    );

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// Fetch a single item by ID.
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "Item ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The item", body = ItemResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such item")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Auth(_caller): Auth,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = ItemStore::new(state.db()).get(&item_id).map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::not_found(format!("Item {item_id} not found")),
        _ => ApiError::internal(format!("Failed to fetch item: {e}")),
    })?;
    Ok(Json(ItemResponse::from(item)))
}

/// Buy an item as the authenticated user.
///
/// Deducts the item price from the caller's balance and appends a
/// purchase to their ledger, atomically. A caller who cannot cover the
/// price gets 422 and nothing changes.
#[utoipa::path(
    post,
    path = "/items/{item_id}/purchase",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "Item ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Purchase recorded", body = PurchaseResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such item"),
        (status = 422, description = "Balance does not cover the price")
    )
)]
pub async fn purchase_item(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(item_id): Path<String>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let purchase = PurchaseStore::new(state.db())
        .record(&caller.user_id, &item_id)
        .map_err(|e| match e {
            StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            StoreError::InsufficientBalance {
                available,
                required,
            } => ApiError::unprocessable(format!(
                "Insufficient balance: have {available}, need {required}"
            )),
            _ => ApiError::internal(format!("Failed to record purchase: {e}")),
        })?;

    tracing::info!(
        buyer = %purchase.buyer_id,
        item_id = %purchase.item_id,
        price = purchase.price,
        "Purchase recorded"
    );

    Ok((StatusCode::CREATED, Json(PurchaseResponse::from(purchase))))
}
