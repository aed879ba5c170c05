//! The store trait that backends implement.

use crate::types::Invitation;
use crate::StoreError;

/// Durable record of invitation tokens.
///
/// Lookups are strictly read-only; the one mutation is the conditional
/// write in [`mark_used`](InvitationStore::mark_used).
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait InvitationStore: Send + Sync {
    /// Look up an invitation by its token.
    ///
    /// Fails with [`StoreError::InvalidArgument`] on a blank token.
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError>;

    /// Look up an invitation by token and realm, exact match on both.
    ///
    /// Fails with [`StoreError::InvalidArgument`] if either is blank.
    async fn find_by_token_and_realm(
        &self,
        token: &str,
        realm: &str,
    ) -> Result<Option<Invitation>, StoreError>;

    /// Create an invitation for `realm` that expires `expiration_seconds`
    /// from now, and return the generated token string.
    ///
    /// Fails with [`StoreError::InvalidArgument`] if `realm` is blank or
    /// `expiration_seconds <= 0`.
    async fn create(&self, realm: &str, expiration_seconds: i64) -> Result<String, StoreError>;

    /// Flip `used` to `true` iff a record matches `(token, realm)` and is
    /// still unconsumed. Returns whether a row was updated; `false` covers
    /// missing, wrong-realm, and already-consumed uniformly, so concurrent
    /// consumers can detect that they lost the race.
    async fn mark_used(&self, token: &str, realm: &str) -> Result<bool, StoreError>;

    /// Page through all invitations, most recently created first.
    async fn find_all(&self, offset: i64, limit: i64) -> Result<Vec<Invitation>, StoreError>;

    /// Total number of invitation records.
    async fn count_all(&self) -> Result<u64, StoreError>;
}
