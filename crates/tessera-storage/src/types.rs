//! Invitation record types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Invitation identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvitationId(pub Uuid);

/// One invitation token record.
///
/// `used` is monotonic: it starts `false` and only ever flips to `true`.
#[derive(Clone, Debug)]
pub struct Invitation {
    pub id: InvitationId,
    pub token: String,
    pub realm: String,
    pub used: bool,
    pub created_on: DateTime<Utc>,
    /// `None` means the token never expires.
    pub expires_on: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Whether the expiry instant, if any, lies before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_on {
            Some(expires_on) => expires_on < now,
            None => false,
        }
    }

    /// Usable means unconsumed and not expired.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(used: bool, expires_on: Option<DateTime<Utc>>) -> Invitation {
        Invitation {
            id: InvitationId(Uuid::now_v7()),
            token: "inv_test".to_string(),
            realm: "acme".to_string(),
            used,
            created_on: Utc::now(),
            expires_on,
        }
    }

    #[test]
    fn no_expiry_never_expires() {
        let now = Utc::now();
        let inv = invitation(false, None);
        assert!(!inv.is_expired_at(now));
        assert!(inv.is_usable_at(now));
    }

    #[test]
    fn future_expiry_is_usable() {
        let now = Utc::now();
        let inv = invitation(false, Some(now + Duration::hours(1)));
        assert!(!inv.is_expired_at(now));
        assert!(inv.is_usable_at(now));
    }

    #[test]
    fn past_expiry_is_not_usable() {
        let now = Utc::now();
        let inv = invitation(false, Some(now - Duration::seconds(1)));
        assert!(inv.is_expired_at(now));
        assert!(!inv.is_usable_at(now));
    }

    #[test]
    fn consumed_is_not_usable_even_before_expiry() {
        let now = Utc::now();
        let inv = invitation(true, Some(now + Duration::hours(1)));
        assert!(!inv.is_expired_at(now));
        assert!(!inv.is_usable_at(now));
    }

    #[test]
    fn expiry_instant_itself_is_not_expired() {
        let now = Utc::now();
        let inv = invitation(false, Some(now));
        assert!(!inv.is_expired_at(now));
    }
}
