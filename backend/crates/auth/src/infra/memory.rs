//! In-memory repository
//!
//! Test double for both repository traits. Behaves like the PostgreSQL
//! store for everything the use cases and middleware observe, and can be
//! switched into a failing mode to simulate an unavailable database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use tokio::sync::Mutex;

use crate::domain::entity::{NewUser, Session, SessionLookup, UserRecord};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    next_user_id: i64,
    users: Vec<StoredUser>,
    sessions: HashMap<String, Session>,
}

struct StoredUser {
    record: UserRecord,
    user_name_canonical: String,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<Mutex<State>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a storage error while set
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> AuthResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Register a user directly, bypassing policy checks on the password
    pub async fn insert_user(&self, user_name: &str, email: &str, password: &str) -> UserId {
        let raw = RawPassword::for_login(password.to_string());
        let password_hash = UserPassword::from_raw(&raw, None).expect("hash test password");
        let user_name = UserName::new(user_name).expect("valid test user name");
        let email = Email::new(email).expect("valid test email");

        let mut state = self.state.lock().await;
        insert(
            &mut state,
            &NewUser {
                user_name,
                email,
                password_hash,
            },
        )
    }

    /// Delete a user without touching their sessions
    pub async fn remove_user(&self, user_id: UserId) {
        let mut state = self.state.lock().await;
        state.users.retain(|u| u.record.user_id != user_id);
    }

    /// Store a session as-is, keeping any other session of the same user
    pub async fn insert_session(&self, session: Session) {
        let mut state = self.state.lock().await;
        state.sessions.insert(session.token.clone(), session);
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn session_tokens(&self) -> Vec<String> {
        self.state.lock().await.sessions.keys().cloned().collect()
    }
}

fn insert(state: &mut State, user: &NewUser) -> UserId {
    state.next_user_id += 1;
    let user_id = UserId::new(state.next_user_id);
    state.users.push(StoredUser {
        record: UserRecord {
            user_id,
            user_name: user.user_name.original().to_string(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
        },
        user_name_canonical: user.user_name.canonical().to_string(),
    });
    user_id
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<UserId> {
        self.check()?;
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.record.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        if state
            .users
            .iter()
            .any(|u| u.user_name_canonical == user.user_name.canonical())
        {
            return Err(AuthError::UserNameTaken);
        }
        Ok(insert(&mut state, user))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<UserRecord>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| &u.record.email == email)
            .map(|u| u.record.clone()))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.users.iter().any(|u| &u.record.email == email))
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .any(|u| u.user_name_canonical == user_name.canonical()))
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn replace_for_user(&self, session: &Session) -> AuthResult<()> {
        self.check()?;
        let mut state = self.state.lock().await;
        state.sessions.retain(|_, s| s.user_id != session.user_id);
        state
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> AuthResult<Option<SessionLookup>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.sessions.get(token).map(|session| SessionLookup {
            session: session.clone(),
            user_name: state
                .users
                .iter()
                .find(|u| u.record.user_id == session.user_id)
                .map(|u| u.record.user_name.clone()),
        }))
    }

    async fn delete(&self, token: &str) -> AuthResult<u64> {
        self.check()?;
        let mut state = self.state.lock().await;
        Ok(u64::from(state.sessions.remove(token).is_some()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        self.check()?;
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - state.sessions.len()) as u64)
    }
}
