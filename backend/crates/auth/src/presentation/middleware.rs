//! Auth Middleware
//!
//! Two stages, always composed through [`AuthGate`](super::router::AuthGate):
//! - `resolve_identity` runs on every request and attaches an [`Identity`]
//! - `require_auth` runs on protected routes and rejects anonymous callers

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::SessionManager;
use crate::application::config::AuthConfig;
use crate::domain::entity::{Identity, SessionUser};
use crate::domain::repository::SessionRepository;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Attach the caller's [`Identity`] to the request
///
/// A cookie that was presented but did not resolve to a live session is
/// cleared on the response. Storage failures resolve to anonymous and leave
/// the cookie alone.
pub async fn resolve_identity<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    let cookie_name = &state.config.session_cookie_name;
    let token = extract_cookie(req.headers(), cookie_name);

    let mut clear_cookie = false;
    let identity = match token {
        None => Identity::Anonymous,
        Some(token) => {
            let sessions = SessionManager::new(state.repo.clone(), state.config.clone());
            match sessions.try_validate(&token).await {
                Ok(Some(user)) => Identity::LoggedIn(user),
                Ok(None) => {
                    clear_cookie = true;
                    Identity::Anonymous
                }
                Err(e) => {
                    tracing::error!(error = %e, "Session lookup failed, continuing as anonymous");
                    Identity::Anonymous
                }
            }
        }
    };

    req.extensions_mut().insert(identity);

    let mut response = next.run(req).await;

    if clear_cookie && !sets_cookie(response.headers(), cookie_name) {
        match state.config.cookie().delete_cookie_header() {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build cookie deletion header"),
        }
    }

    response
}

/// Reject anonymous callers
///
/// Browsers are redirected to the login page (303); clients that accept
/// JSON get a 401 problem document.
pub async fn require_auth<R>(
    State(state): State<AuthMiddlewareState<R>>,
    req: Request,
    next: Next,
) -> Response
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    let logged_in = req.extensions().get::<Identity>().map(Identity::is_logged_in);

    match logged_in {
        Some(true) => next.run(req).await,
        Some(false) => {
            if accepts_json(req.headers()) {
                AuthError::SessionInvalid.into_response()
            } else {
                Redirect::to(&state.config.login_path).into_response()
            }
        }
        None => {
            tracing::error!(
                path = %req.uri().path(),
                "Authorization ran before identity resolution"
            );
            AuthError::Internal("Identity not resolved".to_string()).into_response()
        }
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("application/json"))
}

/// Whether the response already sets the named cookie
fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    let prefix = format!("{name}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

// ============================================================================
// Extractors
// ============================================================================

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "Identity extractor used without resolution");
            AuthError::Internal("Identity not resolved".to_string())
        })
    }
}

/// The logged-in caller; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await? {
            Identity::LoggedIn(user) => Ok(CurrentUser(user)),
            Identity::Anonymous => Err(AuthError::SessionInvalid),
        }
    }
}
