//! The lifecycle engine itself.

use chrono::Utc;
use tessera_storage::InvitationStore;

use crate::{
    EngineError, GeneratedInvitation, InvalidReason, PageInfo, PaginatedInvitations,
    ValidationResult,
};

/// Expiration applied when the caller does not choose one: 24 hours.
pub const DEFAULT_EXPIRATION_SECS: i64 = 86_400;

/// Largest page size an admin listing will serve.
const MAX_PAGE_SIZE: i64 = 100;

const GENERATED_MESSAGE: &str = "Invitation token generated successfully";

/// Lifecycle engine over an injected store.
///
/// Holds no state besides the store handle; every decision re-reads current
/// records so two concurrent calls never act on each other's stale view.
pub struct InvitationService<S> {
    store: S,
}

impl<S: InvitationStore> InvitationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Issue a new invitation token for `realm`.
    ///
    /// `expiration_seconds` defaults to [`DEFAULT_EXPIRATION_SECS`]. The
    /// created record is read back before answering; a miss there means the
    /// store lied about the insert and fails with
    /// [`EngineError::GenerationFailed`].
    pub async fn generate(
        &self,
        realm: &str,
        expiration_seconds: Option<i64>,
    ) -> Result<GeneratedInvitation, EngineError> {
        let seconds = expiration_seconds.unwrap_or(DEFAULT_EXPIRATION_SECS);
        let token = self.store.create(realm, seconds).await?;

        let record = self
            .store
            .find_by_token(&token)
            .await?
            .ok_or_else(|| {
                EngineError::GenerationFailed(format!(
                    "created invitation for realm {realm} could not be read back"
                ))
            })?;

        tracing::info!(realm = %record.realm, "invitation generated");
        Ok(GeneratedInvitation {
            token: record.token,
            realm: record.realm,
            message: GENERATED_MESSAGE.to_string(),
            expires_on: record.expires_on,
            used: record.used,
        })
    }

    /// Decide whether a token may gate a registration attempt.
    ///
    /// Checks run in a fixed order: presence, existence, consumption,
    /// expiry. A token that is both consumed and expired therefore reports
    /// [`InvalidReason::AlreadyUsed`]. Blank or absent inputs are rejected
    /// before the store is touched.
    pub async fn validate_detailed(
        &self,
        token: Option<&str>,
        realm: Option<&str>,
    ) -> Result<ValidationResult, EngineError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(ValidationResult::Invalid(InvalidReason::MissingToken)),
        };
        let realm = match realm {
            Some(r) if r.trim().is_empty() => {
                return Ok(ValidationResult::Invalid(InvalidReason::MissingToken))
            }
            other => other,
        };

        let record = match realm {
            Some(realm) => self.store.find_by_token_and_realm(token, realm).await?,
            None => self.store.find_by_token(token).await?,
        };

        let Some(record) = record else {
            return Ok(ValidationResult::Invalid(InvalidReason::TokenNotFound));
        };
        if record.used {
            return Ok(ValidationResult::Invalid(InvalidReason::AlreadyUsed));
        }
        if record.is_expired_at(Utc::now()) {
            return Ok(ValidationResult::Invalid(InvalidReason::Expired));
        }
        Ok(ValidationResult::Valid(record))
    }

    /// [`validate_detailed`](Self::validate_detailed) without the failure
    /// detail: `Some` iff the token is usable.
    pub async fn validate(
        &self,
        token: Option<&str>,
        realm: Option<&str>,
    ) -> Result<Option<tessera_storage::Invitation>, EngineError> {
        Ok(match self.validate_detailed(token, realm).await? {
            ValidationResult::Valid(record) => Some(record),
            ValidationResult::Invalid(_) => None,
        })
    }

    /// Consume a token after its registration succeeded.
    ///
    /// Deliberately lenient: this runs after the registration is already
    /// committed, so every failure mode logs a warning instead of
    /// propagating. Losing the consumption race lands here too.
    pub async fn mark_as_used(&self, token: &str) {
        if token.trim().is_empty() {
            tracing::warn!("invitation consumption skipped: blank token");
            return;
        }
        match self.store.find_by_token(token).await {
            Ok(Some(record)) => match self.store.mark_used(token, &record.realm).await {
                Ok(true) => {
                    tracing::info!(realm = %record.realm, "invitation consumed");
                }
                Ok(false) => {
                    tracing::warn!(
                        realm = %record.realm,
                        "invitation was already consumed or disappeared"
                    );
                }
                Err(e) => {
                    tracing::warn!(realm = %record.realm, error = %e, "failed to consume invitation");
                }
            },
            Ok(None) => {
                tracing::warn!("invitation consumption skipped: unknown token");
            }
            Err(e) => {
                tracing::warn!(error = %e, "invitation consumption lookup failed");
            }
        }
    }

    /// Admin listing, newest first.
    ///
    /// `page` is clamped to `>= 0` and `size` to `[1, 100]`; out-of-range
    /// requests degrade rather than fail.
    pub async fn list_paginated(
        &self,
        page: i64,
        size: i64,
    ) -> Result<PaginatedInvitations, EngineError> {
        let size = size.clamp(1, MAX_PAGE_SIZE);
        let page = page.max(0);

        let total_elements = self.store.count_all().await?;
        // Saturate: an absurd page number lands on an empty page, never an
        // overflowed offset.
        let data = self.store.find_all(page.saturating_mul(size), size).await?;

        let total_pages = (total_elements as i64 + size - 1) / size;
        Ok(PaginatedInvitations {
            data,
            pagination: PageInfo {
                page,
                size,
                total_elements,
                total_pages,
                has_next: page < total_pages - 1,
                has_previous: page > 0,
            },
        })
    }
}
