// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::require_auth, Role},
    state::AppState,
    storage::{ItemResponse, PurchaseResponse, UserResponse},
};

pub mod auth;
pub mod health;
pub mod items;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Everything below requires a valid bearer token; the middleware
    // stashes the verified identity in request extensions.
    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::get_user))
        .route(
            "/users/{user_id}/balance/{amount}",
            patch(users::adjust_balance),
        )
        .route("/users/{user_id}/balance", get(users::get_balance))
        .route(
            "/users/{user_id}/transactions",
            get(users::list_transactions),
        )
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/{item_id}", get(items::get_item))
        .route("/items/{item_id}/purchase", post(items::purchase_item))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        health::health,
        health::liveness,
        health::readiness,
        users::list_users,
        users::get_user,
        users::adjust_balance,
        users::get_balance,
        users::list_transactions,
        items::list_items,
        items::create_item,
        items::get_item,
        items::purchase_item
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::SignupResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            users::UserListResponse,
            users::BalanceResponse,
            users::TransactionListResponse,
            items::CreateItemRequest,
            items::ItemListResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            UserResponse,
            ItemResponse,
            PurchaseResponse,
            Role
        )
    ),
    tags(
        (name = "Auth", description = "Signup and login"),
        (name = "Users", description = "Accounts, balances, and purchase history"),
        (name = "Items", description = "Item catalog and purchasing"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
