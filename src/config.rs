// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory for the ledger database | `data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_TOKEN_SECRET` | HMAC secret for access-token signing | Random per process |
//! | `AUTH_TOKEN_TTL_SECS` | Access-token lifetime in seconds | `3600` |
//! | `AUTH_TOKEN_ISSUER` | Issuer claim stamped into and required of tokens | `relational-credits` |
//! | `SEED_ADMIN` | `username:password` pair creating the initial admin | Unset |
//! | `TLS_CERT_PATH` | PEM certificate chain enabling HTTPS | Unset (plain HTTP) |
//! | `TLS_KEY_PATH` | PEM private key enabling HTTPS | Unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// The ledger database file (`ledger.redb`) lives here. The directory is
/// created on startup if it does not exist.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the access-token signing secret.
///
/// When unset, a random per-process secret is generated and a warning is
/// logged: every restart then invalidates all outstanding tokens. Set this
/// in any deployment that should survive restarts.
pub const TOKEN_SECRET_ENV: &str = "AUTH_TOKEN_SECRET";

/// Environment variable name for the access-token lifetime in seconds.
pub const TOKEN_TTL_ENV: &str = "AUTH_TOKEN_TTL_SECS";

/// Default access-token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Environment variable name for the token issuer claim.
///
/// Stamped into every issued token and required of every verified one, so
/// tokens minted by unrelated deployments sharing a secret are still
/// rejected.
pub const TOKEN_ISSUER_ENV: &str = "AUTH_TOKEN_ISSUER";

/// Default token issuer claim.
pub const DEFAULT_TOKEN_ISSUER: &str = "relational-credits";

/// Environment variable name for the initial admin account.
///
/// Format is `username:password`. The account is created at startup with the
/// admin role and a zero balance, and skipped if the username already exists.
pub const SEED_ADMIN_ENV: &str = "SEED_ADMIN";

/// Environment variable name for the TLS certificate chain (PEM).
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";

/// Environment variable name for the TLS private key (PEM).
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";

/// Environment variable name selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
