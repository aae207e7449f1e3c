// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::LedgerDb;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<LedgerDb>,
    tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: LedgerDb, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
        }
    }

    /// The ledger database handle.
    pub fn db(&self) -> &LedgerDb {
        &self.db
    }

    /// The access-token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
