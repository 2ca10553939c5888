//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{NewUser, Session, SessionLookup, UserRecord};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;
use kernel::id::UserId;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and return its ID
    ///
    /// Fails with `EmailTaken` / `UserNameTaken` on a uniqueness race.
    async fn create(&self, user: &NewUser) -> AuthResult<UserId>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<UserRecord>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Case-insensitive
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;
}

/// Session store
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Delete every session of `session.user_id`, then insert `session`,
    /// atomically
    async fn replace_for_user(&self, session: &Session) -> AuthResult<()>;

    /// Look up a session by token together with its owner's name
    async fn find(&self, token: &str) -> AuthResult<Option<SessionLookup>>;

    /// Delete by token; returns the number of rows removed (0 or 1)
    async fn delete(&self, token: &str) -> AuthResult<u64>;

    /// Delete every session with `expires_at < now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
