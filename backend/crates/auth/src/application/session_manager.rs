//! Session Manager
//!
//! Issues, validates, revokes and sweeps server-side sessions.
//! A user has at most one live session: issuing a new one removes the old.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::crypto::{generate_session_token, token_fingerprint};

use crate::application::config::AuthConfig;
use crate::domain::entity::{IssuedSession, Session, SessionUser};
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

pub struct SessionManager<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> Clone for SessionManager<S>
where
    S: SessionRepository,
{
    fn clone(&self) -> Self {
        Self {
            session_repo: self.session_repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> SessionManager<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Create a session for `user_id`, replacing any existing one
    ///
    /// No cookie may be set when this fails.
    pub async fn issue(&self, user_id: UserId) -> AuthResult<IssuedSession> {
        let token = generate_session_token()?;
        let session = Session::new(token, user_id, Utc::now(), self.config.session_ttl()?);

        self.session_repo.replace_for_user(&session).await?;

        tracing::info!(
            user_id = %user_id,
            session = %token_fingerprint(&session.token),
            expires_at = %session.expires_at,
            "Session issued"
        );

        Ok(IssuedSession {
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a token to its user, surfacing storage errors
    ///
    /// Expired sessions are deleted on sight. Sessions whose user is gone
    /// resolve to `None`.
    pub async fn try_validate(&self, token: &str) -> AuthResult<Option<SessionUser>> {
        let Some(lookup) = self.session_repo.find(token).await? else {
            tracing::debug!(session = %token_fingerprint(token), "Unknown session token");
            return Ok(None);
        };

        if !lookup.session.is_live_at(Utc::now()) {
            self.session_repo.delete(token).await?;
            tracing::debug!(
                session = %token_fingerprint(token),
                user_id = %lookup.session.user_id,
                "Expired session removed"
            );
            return Ok(None);
        }

        match lookup.user_name {
            Some(user_name) => Ok(Some(SessionUser {
                user_id: lookup.session.user_id,
                user_name,
            })),
            None => {
                tracing::warn!(
                    user_id = %lookup.session.user_id,
                    "Session refers to a missing user"
                );
                Ok(None)
            }
        }
    }

    /// Resolve a token to its user; any failure resolves to `None`
    pub async fn validate(&self, token: &str) -> Option<SessionUser> {
        match self.try_validate(token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(error = %e, "Session validation failed, treating as anonymous");
                None
            }
        }
    }

    /// Delete the session. Unknown tokens are not an error.
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let deleted = self.session_repo.delete(token).await?;
        tracing::info!(
            session = %token_fingerprint(token),
            deleted = deleted,
            "Session revoked"
        );
        Ok(())
    }

    /// Delete every session with `expires_at < now`
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = self.session_repo.delete_expired(now).await?;
        if deleted > 0 {
            tracing::info!(sessions_deleted = deleted, "Expired sessions swept");
        }
        Ok(deleted)
    }
}
