// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Credits - Store-Credit Ledger Service
//!
//! This crate provides an HTTP backend for user accounts with store-credit
//! balances, a purchasable item catalog, and an immutable purchase ledger,
//! all persisted in an embedded ACID database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password credentials and bearer-token auth (HS256 JWT)
//! - `storage` - Embedded persistence (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
