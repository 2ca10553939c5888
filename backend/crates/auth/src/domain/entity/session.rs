//! Session Entity
//!
//! Server-side session bound to the browser cookie. A user owns at most one
//! live session; the store enforces this with `UNIQUE(user_id)`.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::UserId;

/// Session row
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque random token (cookie value, primary key)
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session expiring `ttl` after `now`, saturating at the latest
    /// representable instant
    pub fn new(token: String, user_id: UserId, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            token,
            user_id,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Live iff `expires_at > now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session joined with its owner
///
/// `user_name` is `None` when the owning user no longer exists.
#[derive(Debug, Clone)]
pub struct SessionLookup {
    pub session: Session,
    pub user_name: Option<String>,
}

/// What the caller needs to set the cookie after issuance
#[derive(Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_boundary() {
        let now = Utc::now();
        let session = Session::new("t".into(), UserId::new(1), now, TimeDelta::hours(24));

        assert!(session.is_live_at(now));
        assert!(session.is_live_at(now + TimeDelta::hours(24) - TimeDelta::seconds(1)));
        // Exactly at expiry the session is no longer live
        assert!(!session.is_live_at(now + TimeDelta::hours(24)));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let session = Session::new("t".into(), UserId::new(1), Utc::now(), TimeDelta::MAX);
        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(
            "super-secret-token".into(),
            UserId::new(1),
            Utc::now(),
            TimeDelta::hours(1),
        );
        assert!(!format!("{:?}", session).contains("super-secret-token"));
    }
}
