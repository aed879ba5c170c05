//! Liveness and readiness probe tests.

use axum::extract::State;
use axum::http::StatusCode;

use super::common;
use crate::http::{health_handler, readiness_handler};

#[tokio::test]
async fn healthz_always_answers() {
    assert_eq!(health_handler().await, "ok");
}

#[tokio::test]
async fn readyz_follows_the_readiness_flag() {
    let (ready_tx, ready_rx) = tokio::sync::watch::channel(false);
    let mut state = common::test_state().await;
    state.ready = ready_rx;

    let err = readiness_handler(State(state.clone())).await.unwrap_err();
    assert_eq!(err, StatusCode::SERVICE_UNAVAILABLE);

    ready_tx.send(true).unwrap();
    assert_eq!(readiness_handler(State(state.clone())).await, Ok("ok"));

    // Shutdown drops the flag again so traffic drains cleanly.
    ready_tx.send(false).unwrap();
    assert!(readiness_handler(State(state)).await.is_err());
}
