//! Storage contract for invitation tokens.
//!
//! Backends implement [`InvitationStore`]; everything above them depends
//! only on this crate.

mod store;
mod types;

pub use store::InvitationStore;
#[cfg(feature = "test-support")]
pub use store::MockInvitationStore;
pub use types::{Invitation, InvitationId};

use thiserror::Error;

/// Errors surfaced by storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller passed an argument the store cannot act on (blank token or
    /// realm, non-positive expiration). An integration bug, never a user
    /// condition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A UNIQUE constraint rejected the write.
    #[error("record already exists")]
    AlreadyExists,

    /// Any other driver or database failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Generate the opaque bearer string for a new invitation.
///
/// 32 bytes from the OS RNG, hex-encoded, `inv_`-prefixed. The value is the
/// credential itself; backends store it verbatim under a UNIQUE constraint.
pub fn new_invitation_token() -> String {
    use rand_core::RngCore;
    let mut secret = [0u8; 32];
    rand_core::OsRng.fill_bytes(&mut secret);
    format!("inv_{}", hex::encode(secret))
}
