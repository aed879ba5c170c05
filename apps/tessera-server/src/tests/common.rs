//! Shared test scaffolding.

use axum::http::HeaderMap;
use std::sync::Arc;
use tessera_invites::InvitationService;
use tessera_store_sqlite::SqliteStore;

use crate::backend::StoreBackend;
use crate::config::ServerConfig;
use crate::http::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// AppState over an in-memory SQLite store with the admin surface enabled.
pub async fn test_state() -> AppState {
    state_with_config(ServerConfig {
        admin_token: Some(ADMIN_TOKEN.to_string()),
    })
    .await
}

pub async fn state_with_config(config: ServerConfig) -> AppState {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let backend = StoreBackend::Sqlite(Arc::new(store));
    let (_ready_tx, ready_rx) = tokio::sync::watch::channel(true);

    AppState {
        service: Arc::new(InvitationService::new(backend)),
        config,
        ready: ready_rx,
    }
}

/// Headers carrying the expected admin bearer token.
pub fn admin_headers() -> HeaderMap {
    bearer_headers(ADMIN_TOKEN)
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        format!("Bearer {token}").parse().unwrap(),
    );
    headers
}
