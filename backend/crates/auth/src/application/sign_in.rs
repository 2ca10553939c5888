//! Sign In Use Case
//!
//! Verifies email + password and issues a session.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::session_manager::SessionManager;
use crate::domain::entity::IssuedSession;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user_id: UserId,
    pub user_name: String,
    pub session: IssuedSession,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    sessions: SessionManager<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            sessions: SessionManager::new(session_repo, config.clone()),
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let raw_password = RawPassword::for_login(input.password);

        // A malformed email cannot belong to anyone; it takes the unknown-user path
        let user = match Email::new(&input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let pepper = self.config.password_pepper.clone();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        // Argon2 is CPU-bound; both branches pay the same cost
        let password_valid = tokio::task::spawn_blocking(move || {
            let pepper = pepper.as_deref();
            match stored_hash {
                Some(hash) => hash.verify(&raw_password, pepper),
                None => UserPassword::verify_dummy(&raw_password, pepper),
            }
        })
        .await?;

        let user = match user {
            Some(user) if password_valid => user,
            _ => {
                tracing::warn!("Failed login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let session = self.sessions.issue(user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SignInOutput {
            user_id: user.user_id,
            user_name: user.user_name,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthRepository;

    const PASSWORD: &str = "correct-horse-battery";

    type SignIn = SignInUseCase<InMemoryAuthRepository, InMemoryAuthRepository>;

    async fn setup() -> (Arc<InMemoryAuthRepository>, SignIn) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        repo.insert_user("alice", "alice@example.com", PASSWORD).await;
        let use_case = SignInUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(AuthConfig::development()),
        );
        (repo, use_case)
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_issues_session() {
        let (repo, use_case) = setup().await;

        let output = use_case
            .execute(input("alice@example.com", PASSWORD))
            .await
            .unwrap();

        assert_eq!(output.user_name, "alice");
        assert_eq!(output.session.token.len(), 43);
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let (_, use_case) = setup().await;
        assert!(use_case.execute(input("  Alice@Example.COM ", PASSWORD)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let (repo, use_case) = setup().await;

        let unknown = use_case
            .execute(input("nobody@example.com", PASSWORD))
            .await
            .unwrap_err();
        let wrong = use_case
            .execute(input("alice@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let malformed = use_case.execute(input("not-an-email", PASSWORD)).await.unwrap_err();

        for err in [&unknown, &wrong, &malformed] {
            assert!(matches!(err, AuthError::InvalidCredentials));
            assert_eq!(err.to_string(), "Invalid email or password");
        }
        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_email_still_pays_hash_cost() {
        let (_, use_case) = setup().await;
        // Warm the dummy hash so the first measurement is not skewed
        platform::password::warm_up();

        let start = std::time::Instant::now();
        let _ = use_case.execute(input("alice@example.com", "wrong-password")).await;
        let wrong_password = start.elapsed();

        let start = std::time::Instant::now();
        let _ = use_case.execute(input("nobody@example.com", "wrong-password")).await;
        let unknown_email = start.elapsed();

        // Same order of magnitude; a skipped hash would be ~100x faster
        assert!(unknown_email * 4 > wrong_password);
    }

    #[tokio::test]
    async fn test_second_login_replaces_first_session() {
        let (repo, use_case) = setup().await;

        let device_a = use_case.execute(input("alice@example.com", PASSWORD)).await.unwrap();
        let device_b = use_case.execute(input("alice@example.com", PASSWORD)).await.unwrap();

        let tokens = repo.session_tokens().await;
        assert_eq!(tokens, vec![device_b.session.token.clone()]);
        assert_ne!(device_a.session.token, device_b.session.token);
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_credentials_error() {
        let (repo, use_case) = setup().await;
        repo.set_failing(true);

        let err = use_case
            .execute(input("alice@example.com", PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
    }
}
