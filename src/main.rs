// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use axum_server::tls_rustls::RustlsConfig;
use ring::rand::{SecureRandom, SystemRandom};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relational_credits_server::{
    api::router,
    auth::{
        credentials::{hash_password, normalize_username},
        Role, TokenService,
    },
    config,
    state::AppState,
    storage::{LedgerDb, StoreError, StoredUser, UserStore},
};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// JSON lines for log aggregation.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(config::LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

/// Read the token signing secret, or generate an ephemeral one.
///
/// Without a configured secret every restart invalidates all outstanding
/// tokens, which is fine for development and wrong for production.
fn load_token_secret() -> Vec<u8> {
    match env::var(config::TOKEN_SECRET_ENV) {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            tracing::warn!(
                "{} not set; using an ephemeral signing secret, tokens will not survive restarts",
                config::TOKEN_SECRET_ENV
            );
            let rng = SystemRandom::new();
            let mut secret = [0u8; 32];
            rng.fill(&mut secret)
                .expect("Failed to generate signing secret");
            secret.to_vec()
        }
    }
}

/// Create the admin account named by `SEED_ADMIN` (`username:password`).
///
/// Skipped silently when the variable is unset, and skipped with a log line
/// when the username is already taken, so repeated startups are harmless.
fn seed_admin(db: &LedgerDb) {
    let seed = match env::var(config::SEED_ADMIN_ENV) {
        Ok(value) => value,
        Err(_) => return,
    };
    let (username, password) = match seed.split_once(':') {
        Some(parts) => parts,
        None => {
            tracing::warn!(
                "{} must look like username:password, skipping admin seed",
                config::SEED_ADMIN_ENV
            );
            return;
        }
    };

    let username = normalize_username(username);
    if username.is_empty() || password.is_empty() {
        tracing::warn!(
            "{} has an empty username or password, skipping admin seed",
            config::SEED_ADMIN_ENV
        );
        return;
    }

    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "Failed to hash seed admin password");
            return;
        }
    };

    let user = StoredUser::new(username, password_hash, Role::Admin);
    match UserStore::new(db).create(&user) {
        Ok(()) => tracing::info!(user_id = %user.user_id, "Seeded admin account"),
        Err(StoreError::AlreadyExists(_)) => {
            tracing::info!("Admin account already exists, seed skipped");
        }
        Err(e) => tracing::error!(error = %e, "Failed to seed admin account"),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Open (or create) the ledger database
    let data_dir =
        env::var(config::DATA_DIR_ENV).unwrap_or_else(|_| config::DEFAULT_DATA_DIR.to_string());
    let db_path = PathBuf::from(&data_dir).join("ledger.redb");
    let db = LedgerDb::open(&db_path).expect("Failed to open ledger database");
    tracing::info!(path = %db_path.display(), "Ledger database ready");

    seed_admin(&db);

    // Token service
    let secret = load_token_secret();
    let issuer = env::var(config::TOKEN_ISSUER_ENV)
        .unwrap_or_else(|_| config::DEFAULT_TOKEN_ISSUER.to_string());
    let ttl_secs: i64 = env::var(config::TOKEN_TTL_ENV)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(config::DEFAULT_TOKEN_TTL_SECS);
    let tokens = TokenService::new(&secret, issuer, ttl_secs);

    let state = AppState::new(db, tokens);
    let app = router(state);

    // Parse bind address
    let host = env::var(config::HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(config::PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    // Drain in-flight requests on Ctrl-C
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received, draining connections");
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    // Serve HTTPS when a certificate is configured, plain HTTP otherwise
    let tls_cert = env::var(config::TLS_CERT_ENV).ok();
    let tls_key = env::var(config::TLS_KEY_ENV).ok();
    match (tls_cert, tls_key) {
        (Some(cert), Some(key)) => {
            // Install the ring crypto provider for rustls (must be done
            // before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&cert, &key)
                .await
                .expect("Failed to load TLS certificate or key");

            tracing::info!("Listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        _ => {
            tracing::info!("Listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }
}
