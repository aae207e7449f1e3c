// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential handling and token-based authentication for the credits API.
//!
//! ## Auth Flow
//!
//! 1. Client signs up with a username and password; the password is stored
//!    as a salted PBKDF2 hash
//! 2. Client logs in; on a match the server mints an HMAC-signed access
//!    token carrying `sub` (user ID) and `role` claims
//! 3. Client sends `Authorization: Bearer <token>` on every request
//! 4. Server verifies signature, expiry, and issuer, then attaches the
//!    authenticated user to the request
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Password verification is constant time
//! - Tokens are stateless; a compromised token stays valid until expiry
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod tokens;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{Auth, AdminOnly};
pub use roles::Role;
pub use tokens::TokenService;
