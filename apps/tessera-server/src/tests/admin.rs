//! Admin endpoint tests: authorization, generation, listing.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};

use super::common;
use crate::config::ServerConfig;
use crate::http::{generate_invitation, list_invitations, GenerateRequest, ListQuery};

fn seconds_until(rfc3339: &str) -> i64 {
    let expires_on: DateTime<Utc> = DateTime::parse_from_rfc3339(rfc3339).unwrap().into();
    (expires_on - Utc::now()).num_seconds()
}

#[tokio::test]
async fn generate_rejects_missing_and_wrong_bearer() {
    let state = common::test_state().await;

    let err = generate_invitation(
        State(state.clone()),
        Path("acme".to_string()),
        HeaderMap::new(),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let err = generate_invitation(
        State(state),
        Path("acme".to_string()),
        common::bearer_headers("not-the-admin"),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_surface_is_disabled_without_configured_token() {
    let state = common::state_with_config(ServerConfig::default()).await;

    let err = generate_invitation(
        State(state.clone()),
        Path("acme".to_string()),
        common::admin_headers(),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let err = list_invitations(
        State(state),
        Query(ListQuery {
            page: None,
            size: None,
        }),
        common::admin_headers(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn generate_defaults_to_24_hours() {
    let state = common::test_state().await;

    let Json(resp) = generate_invitation(
        State(state),
        Path("acme".to_string()),
        common::admin_headers(),
        None,
    )
    .await
    .unwrap();

    assert!(resp.token.starts_with("inv_"));
    assert_eq!(resp.realm, "acme");
    assert!(!resp.used);
    let secs = seconds_until(resp.expiration_time.as_deref().unwrap());
    assert!((86_390..=86_400).contains(&secs), "got {secs}");
}

#[tokio::test]
async fn generate_honors_positive_expiration_time() {
    let state = common::test_state().await;

    let Json(resp) = generate_invitation(
        State(state),
        Path("acme".to_string()),
        common::admin_headers(),
        Some(Json(GenerateRequest {
            expiration_time: Some(3600),
        })),
    )
    .await
    .unwrap();

    let secs = seconds_until(resp.expiration_time.as_deref().unwrap());
    assert!((3590..=3600).contains(&secs), "got {secs}");
}

#[tokio::test]
async fn generate_falls_back_on_non_positive_expiration_time() {
    let state = common::test_state().await;

    let Json(resp) = generate_invitation(
        State(state),
        Path("acme".to_string()),
        common::admin_headers(),
        Some(Json(GenerateRequest {
            expiration_time: Some(-5),
        })),
    )
    .await
    .unwrap();

    let secs = seconds_until(resp.expiration_time.as_deref().unwrap());
    assert!(secs > 3600, "non-positive expiry should use the default");
}

#[tokio::test]
async fn listing_paginates_across_realms() {
    let state = common::test_state().await;
    for i in 0..25 {
        state
            .service
            .generate(&format!("realm-{}", i % 3), Some(3600))
            .await
            .unwrap();
    }

    let Json(first) = list_invitations(
        State(state.clone()),
        Query(ListQuery {
            page: Some(0),
            size: Some(10),
        }),
        common::admin_headers(),
    )
    .await
    .unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.pagination.total_elements, 25);
    assert_eq!(first.pagination.total_pages, 3);
    assert!(first.pagination.has_next);
    assert!(!first.pagination.has_previous);

    let Json(last) = list_invitations(
        State(state),
        Query(ListQuery {
            page: Some(2),
            size: Some(10),
        }),
        common::admin_headers(),
    )
    .await
    .unwrap();
    assert_eq!(last.data.len(), 5);
    assert!(!last.pagination.has_next);
    assert!(last.pagination.has_previous);
}

#[tokio::test]
async fn listing_defaults_to_first_page_of_twenty() {
    let state = common::test_state().await;
    for _ in 0..25 {
        state.service.generate("acme", Some(3600)).await.unwrap();
    }

    let Json(resp) = list_invitations(
        State(state),
        Query(ListQuery {
            page: None,
            size: None,
        }),
        common::admin_headers(),
    )
    .await
    .unwrap();
    assert_eq!(resp.data.len(), 20);
    assert_eq!(resp.pagination.page, 0);
    assert_eq!(resp.pagination.size, 20);
    assert_eq!(resp.pagination.total_pages, 2);
}
