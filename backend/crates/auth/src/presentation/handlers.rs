//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{SessionManager, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase};
use crate::domain::entity::Identity;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionStatusResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        user_name: req.user_name,
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: output.user_id,
            user_name: output.user_name,
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    // Detached so a client disconnect cannot cancel session issuance midway
    let output = tokio::spawn(async move { use_case.execute(input).await }).await??;

    let cookie = state
        .config
        .cookie()
        .set_cookie_header(&output.session.token, output.session.expires_at)
        .map_err(|e| AuthError::Internal(format!("Invalid session cookie: {e}")))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user_id: output.user_id,
            user_name: output.user_name,
            expires_at: output.session.expires_at,
        }),
    )
        .into_response())
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always clears the cookie. A revoke that fails in storage is still
/// reported as a server error so the client does not assume the session is gone.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let cookie = state
        .config
        .cookie()
        .delete_cookie_header()
        .map_err(|e| AuthError::Internal(format!("Invalid session cookie: {e}")))?;

    let revoked = match extract_cookie(&headers, &state.config.session_cookie_name) {
        Some(token) => {
            SessionManager::new(state.repo.clone(), state.config.clone())
                .revoke(&token)
                .await
        }
        None => Ok(()),
    };

    let mut response = match revoked {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    };
    response.headers_mut().append(header::SET_COOKIE, cookie);

    Ok(response)
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status(identity: Identity) -> Json<SessionStatusResponse> {
    let response = match identity.user() {
        Some(user) => SessionStatusResponse {
            authenticated: true,
            user_id: Some(user.user_id),
            user_name: Some(user.user_name.clone()),
        },
        None => SessionStatusResponse {
            authenticated: false,
            user_id: None,
            user_name: None,
        },
    };
    Json(response)
}
