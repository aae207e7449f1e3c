// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and credential normalization.
//!
//! Passwords are hashed with PBKDF2-HMAC-SHA256 and a per-password random
//! salt. The iteration count is embedded in the encoded string, so it can be
//! raised later without invalidating existing records:
//!
//! ```text
//! pbkdf2-sha256$600000$<base64 salt>$<base64 hash>
//! ```
//!
//! Verification goes through `ring::pbkdf2::verify`, which compares in
//! constant time.

use std::num::NonZeroU32;

use base64ct::{Base64, Encoding};
use ring::digest::SHA256_OUTPUT_LEN;
use ring::rand::{SecureRandom, SystemRandom};
use ring::pbkdf2;
use unicode_normalization::UnicodeNormalization;

use super::error::AuthError;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Encoded-string scheme tag.
const SCHEME: &str = "pbkdf2-sha256";

/// PBKDF2 iteration count for newly hashed passwords.
const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(600_000) {
    Some(iterations) => iterations,
    None => panic!("iteration count must be non-zero"),
};

/// Salt length in bytes.
const SALT_LEN: usize = 32;

/// Normalize a username for storage and lookup.
///
/// Trims surrounding whitespace and applies Unicode NFC, so visually
/// identical usernames with different codepoint sequences map to the same
/// record.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().nfc().collect()
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| AuthError::InternalError("salt generation failed".to_string()))?;

    let mut hash = [0u8; SHA256_OUTPUT_LEN];
    pbkdf2::derive(
        PBKDF2_ALG,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!(
        "{SCHEME}${}${}${}",
        PBKDF2_ITERATIONS,
        Base64::encode_string(&salt),
        Base64::encode_string(&hash),
    ))
}

/// Verify a password against an encoded hash.
///
/// Returns `false` for wrong passwords and for encoded strings this module
/// did not produce.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some((iterations, salt, hash)) = parse_encoded(encoded) else {
        return false;
    };

    pbkdf2::verify(PBKDF2_ALG, iterations, &salt, password.as_bytes(), &hash).is_ok()
}

fn parse_encoded(encoded: &str) -> Option<(NonZeroU32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations = NonZeroU32::new(parts.next()?.parse().ok()?)?;
    let salt = Base64::decode_vec(parts.next()?).ok()?;
    let hash = Base64::decode_vec(parts.next()?).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((iterations, salt, hash))
}
