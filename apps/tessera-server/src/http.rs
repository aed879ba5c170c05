//! HTTP surface: admin endpoints, the registration-gate endpoints, and the
//! liveness/readiness probes.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_invites::{EngineError, InvitationService, ValidationResult};

use crate::backend::StoreBackend;
use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InvitationService<StoreBackend>>,
    pub config: ServerConfig,
    pub ready: tokio::sync::watch::Receiver<bool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/readyz", get(readiness_handler))
        .route(
            "/api/v1/realms/:realm/invitations/generate",
            post(generate_invitation),
        )
        .route("/api/v1/invitations", get(list_invitations))
        .route(
            "/api/v1/realms/:realm/invitations/validate",
            post(validate_invitation),
        )
        .route("/api/v1/invitations/consume", post(consume_invitation))
        .with_state(state)
}

// ── errors ──

/// JSON `{"error": …}` body with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
}

impl ApiError {
    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: "admin authorization required".to_string(),
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.error }));
        (self.status, body).into_response()
    }
}

// ── admin authorization ──

/// Admin endpoints require `Authorization: Bearer <TESSERA_ADMIN_TOKEN>`.
/// With no token configured the admin surface is disabled and everything
/// gets 403.
fn require_admin(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ApiError> {
    let Some(expected) = config.admin_token.as_deref() else {
        return Err(ApiError::forbidden());
    };
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::forbidden()),
    }
}

// ── probes ──

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn readiness_handler(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    if *state.ready.borrow() {
        Ok("ok")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

// ── wire models ──

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Seconds until expiry; non-positive or absent falls back to the
    /// default of 24 hours.
    pub expiration_time: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub token: String,
    pub realm: String,
    pub message: String,
    pub expiration_time: Option<String>,
    pub used: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDto {
    pub id: String,
    pub token: String,
    pub used: bool,
    pub realm: String,
    pub created_on: String,
    pub expires_on: Option<String>,
}

impl From<&tessera_storage::Invitation> for InvitationDto {
    fn from(inv: &tessera_storage::Invitation) -> Self {
        Self {
            id: inv.id.0.to_string(),
            token: inv.token.clone(),
            used: inv.used,
            realm: inv.realm.clone(),
            created_on: inv.created_on.to_rfc3339(),
            expires_on: inv.expires_on.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub page: i64,
    pub size: i64,
    pub total_elements: u64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<InvitationDto>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub token: String,
}

// ── handlers ──

/// `POST /api/v1/realms/:realm/invitations/generate` (admin)
pub async fn generate_invitation(
    State(state): State<AppState>,
    Path(realm): Path<String>,
    headers: HeaderMap,
    body: Option<Json<GenerateRequest>>,
) -> Result<Json<GenerateResponse>, ApiError> {
    require_admin(&headers, &state.config)?;

    let expiration = body
        .and_then(|Json(req)| req.expiration_time)
        .filter(|secs| *secs > 0);

    let generated = state.service.generate(&realm, expiration).await?;
    Ok(Json(GenerateResponse {
        token: generated.token,
        realm: generated.realm,
        message: generated.message,
        expiration_time: generated.expires_on.map(|t| t.to_rfc3339()),
        used: generated.used,
    }))
}

/// `GET /api/v1/invitations?page=&size=` (admin; lists across realms)
pub async fn list_invitations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<ListResponse>, ApiError> {
    require_admin(&headers, &state.config)?;

    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(20);
    let listing = state.service.list_paginated(page, size).await?;

    Ok(Json(ListResponse {
        data: listing.data.iter().map(InvitationDto::from).collect(),
        pagination: PaginationDto {
            page: listing.pagination.page,
            size: listing.pagination.size,
            total_elements: listing.pagination.total_elements,
            total_pages: listing.pagination.total_pages,
            has_next: listing.pagination.has_next,
            has_previous: listing.pagination.has_previous,
        },
    }))
}

/// `POST /api/v1/realms/:realm/invitations/validate` — registration gate
/// pre-check. Verdicts are values: the response is always 200 unless the
/// store itself failed.
pub async fn validate_invitation(
    State(state): State<AppState>,
    Path(realm): Path<String>,
    body: Option<Json<ValidateRequest>>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let token = body.and_then(|Json(req)| req.token);
    let result = state
        .service
        .validate_detailed(token.as_deref(), Some(&realm))
        .await?;

    Ok(Json(match result {
        ValidationResult::Valid(_) => ValidateResponse {
            valid: true,
            error_code: None,
        },
        ValidationResult::Invalid(reason) => ValidateResponse {
            valid: false,
            error_code: Some(reason.user_code()),
        },
    }))
}

/// `POST /api/v1/invitations/consume` — registration gate post-success
/// hook. Always 204: consumption bookkeeping must never fail a
/// registration that already succeeded.
pub async fn consume_invitation(
    State(state): State<AppState>,
    Json(req): Json<ConsumeRequest>,
) -> StatusCode {
    state.service.mark_as_used(&req.token).await;
    StatusCode::NO_CONTENT
}
