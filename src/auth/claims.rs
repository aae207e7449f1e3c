// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-token claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Claims carried by a self-issued access token.
///
/// Tokens are minted by [`super::tokens::TokenService`] at login and verified
/// on every authenticated request. The set is deliberately small: identity,
/// role, validity window, issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the canonical user ID
    pub sub: String,

    /// Role granted to the subject when the token was minted
    pub role: Role,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,

    /// Issuer, checked against the configured value on verification
    pub iss: String,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a request. Inserted into request extensions
/// by the auth middleware and read back by the `Auth` extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user ID (token `sub` claim)
    pub user_id: String,

    /// User's role
    pub role: Role,

    /// Token expiration (Unix timestamp, available for logging)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            sub: "user_123".to_string(),
            role: Role::Admin,
            iat: 1700000000,
            exp: 1700003600,
            iss: "relational-credits".to_string(),
        }
    }

    #[test]
    fn from_claims_extracts_user_id() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn from_claims_extracts_role() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_admin());
    }

    #[test]
    fn has_role_checks_privilege() {
        let mut claims = sample_claims();
        claims.role = Role::Standard;
        let user = AuthenticatedUser::from_claims(claims);

        assert!(user.has_role(Role::Standard));
        assert!(!user.has_role(Role::Admin));
        assert!(!user.is_admin());
    }

    #[test]
    fn claims_round_trip_through_json() {
        let claims = sample_claims();
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""role":"admin""#));

        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sub, claims.sub);
        assert_eq!(back.role, Role::Admin);
        assert_eq!(back.iss, claims.iss);
    }
}
