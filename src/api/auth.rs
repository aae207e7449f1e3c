// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup and login endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::{
        credentials::{hash_password, normalize_username, verify_password},
        Role,
    },
    error::ApiError,
    state::AppState,
    storage::{StoreError, StoredUser, UserStore},
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to create an account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Desired username (unique)
    pub username: String,
    /// Password in plaintext; only its salted hash is stored
    pub password: String,
}

/// Response after a successful signup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    /// ID of the created user
    pub user_id: String,
    /// Normalized username
    pub username: String,
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Response carrying the access token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the Authorization header
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a new account.
///
/// New accounts get the standard role and a zero balance.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Empty username or password"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let username = normalize_username(&request.username);
    if username.is_empty() {
        return Err(ApiError::bad_request("Username must not be empty"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = StoredUser::new(username, password_hash, Role::Standard);
    UserStore::new(state.db()).create(&user).map_err(|e| match e {
        StoreError::AlreadyExists(_) => ApiError::conflict("Username is already taken"),
        _ => ApiError::internal(format!("Failed to create user: {e}")),
    })?;

    tracing::info!(user_id = %user.user_id, "User account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.user_id,
            username: user.username,
        }),
    ))
}

/// Exchange credentials for an access token.
///
/// Unknown usernames and wrong passwords get the same response, so the
/// endpoint does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = normalize_username(&request.username);

    let user = match UserStore::new(state.db()).get_by_username(&username) {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            tracing::warn!(username = %username, "Login failed: unknown username");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
        Err(e) => return Err(ApiError::internal(format!("Failed to look up user: {e}"))),
    };

    if !verify_password(&request.password, &user.password_hash) {
        tracing::warn!(user_id = %user.user_id, "Login failed: wrong password");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = state
        .tokens()
        .issue(&user.user_id, user.role)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    tracing::info!(user_id = %user.user_id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: token,
    }))
}
