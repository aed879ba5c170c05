//! Business rules for invitation tokens.
//!
//! [`InvitationService`] sits on top of any [`tessera_storage::InvitationStore`]
//! and owns every lifecycle decision: issuing a token, deciding whether a
//! registration attempt may proceed, and consuming the token afterwards. The
//! store below it holds no rules of its own.

mod service;

pub use service::{InvitationService, DEFAULT_EXPIRATION_SECS};

use chrono::{DateTime, Utc};
use tessera_storage::{Invitation, StoreError};
use thiserror::Error;

/// Errors surfaced by the lifecycle engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A freshly created token could not be read back. Points at a store
    /// inconsistency and is never silently swallowed.
    #[error("invitation generation failed: {0}")]
    GenerationFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a token failed validation.
///
/// `TokenNotFound` and `Expired` are distinct here but share a user-facing
/// code: callers must not learn whether a rejected token ever existed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// Token (or realm, when one is required) was absent or blank.
    MissingToken,
    /// No record matches the token (and realm, when supplied).
    TokenNotFound,
    /// The token has already been consumed.
    AlreadyUsed,
    /// The token exists and is unconsumed, but its expiry lies in the past.
    Expired,
}

impl InvalidReason {
    /// Stable wire code shown to end users.
    pub fn user_code(&self) -> &'static str {
        match self {
            InvalidReason::MissingToken => "inviteCodeMissing",
            InvalidReason::TokenNotFound | InvalidReason::Expired => "inviteCodeInvalid",
            InvalidReason::AlreadyUsed => "inviteCodeAlreadyUsed",
        }
    }
}

/// Outcome of a detailed validation. Validation failures are values, not
/// errors; only store/transport trouble comes back as [`EngineError`].
#[derive(Clone, Debug)]
pub enum ValidationResult {
    Valid(Invitation),
    Invalid(InvalidReason),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }
}

/// Response payload for a newly generated invitation.
#[derive(Clone, Debug)]
pub struct GeneratedInvitation {
    pub token: String,
    pub realm: String,
    pub message: String,
    pub expires_on: Option<DateTime<Utc>>,
    pub used: bool,
}

/// Pagination metadata accompanying a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub size: i64,
    pub total_elements: u64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One page of invitations, newest first.
#[derive(Clone, Debug)]
pub struct PaginatedInvitations {
    pub data: Vec<Invitation>,
    pub pagination: PageInfo,
}
