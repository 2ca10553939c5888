//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth, resolve_identity};

/// Create the Auth router (mount under `/api/auth`)
pub fn auth_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState { repo, config };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/status", get(handlers::session_status))
        .with_state(state)
}

/// Composes identity resolution and authorization around an application
///
/// Resolution wraps every route; authorization wraps only the protected
/// ones and therefore always runs second.
#[derive(Clone)]
pub struct AuthGate<R>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    state: AuthMiddlewareState<R>,
}

impl<R> AuthGate<R>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            state: AuthMiddlewareState { repo, config },
        }
    }

    /// Panics if `protected` has no routes (see [`Router::route_layer`]).
    pub fn apply(self, public: Router, protected: Router) -> Router {
        let protected = protected.route_layer(middleware::from_fn_with_state(
            self.state.clone(),
            require_auth::<R>,
        ));

        public
            .merge(protected)
            .layer(middleware::from_fn_with_state(self.state, resolve_identity::<R>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::application::SessionManager;
    use crate::domain::entity::Identity;
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::presentation::middleware::CurrentUser;

    async fn whoami(identity: Identity) -> String {
        identity
            .user()
            .map_or("anonymous".to_string(), |u| u.user_name.clone())
    }

    async fn secret(CurrentUser(user): CurrentUser) -> String {
        format!("secret for {}", user.user_name)
    }

    fn app(repo: &Arc<InMemoryAuthRepository>) -> Router {
        let config = Arc::new(AuthConfig::development());
        let public = Router::new()
            .route("/whoami", get(whoami))
            .nest("/api/auth", auth_router(repo.clone(), config.clone()));
        let protected = Router::new().route("/secret", post(secret));

        AuthGate::new(repo.clone(), config).apply(public, protected)
    }

    async fn logged_in() -> (Arc<InMemoryAuthRepository>, String) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user_id = repo
            .insert_user("alice", "alice@example.com", "password-123")
            .await;
        let issued = SessionManager::new(repo.clone(), Arc::new(AuthConfig::development()))
            .issue(user_id)
            .await
            .unwrap();
        (repo, issued.token)
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("session_token={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("session_token={token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_no_cookie_is_anonymous() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let response = app(&repo).oneshot(request("GET", "/whoami", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookies(&response).is_empty());
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_cookie_resolves_user() {
        let (repo, token) = logged_in().await;

        let response = app(&repo)
            .oneshot(request("POST", "/secret", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookies(&response).is_empty());
        assert_eq!(body_string(response).await, "secret for alice");
    }

    #[tokio::test]
    async fn test_rejected_cookie_is_cleared() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let response = app(&repo)
            .oneshot(request("GET", "/whoami", Some("forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("session_token=;"));
        assert!(cookies[0].contains("Max-Age=0"));
        assert!(cookies[0].contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[tokio::test]
    async fn test_anonymous_browser_is_redirected() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let response = app(&repo).oneshot(request("POST", "/secret", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_anonymous_json_client_gets_401() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let req = Request::builder()
            .method("POST")
            .uri("/secret")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let response = app(&repo).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["detail"], "Authentication required");
    }

    #[tokio::test]
    async fn test_storage_failure_fails_closed_and_keeps_cookie() {
        let (repo, token) = logged_in().await;
        repo.set_failing(true);

        let response = app(&repo)
            .oneshot(request("POST", "/secret", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_authorization_without_resolution_fails_closed() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let state = AuthMiddlewareState {
            repo: repo.clone(),
            config: Arc::new(AuthConfig::development()),
        };
        let misordered = Router::new()
            .route("/secret", post(secret))
            .route_layer(middleware::from_fn_with_state(
                state,
                require_auth::<InMemoryAuthRepository>,
            ));

        let response = misordered.oneshot(request("POST", "/secret", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.contains("Internal server error"));
        assert!(!body.contains("Identity not resolved"));
    }

    #[tokio::test]
    async fn test_register_login_status_logout() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let app = app(&repo);

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/auth/register",
                serde_json::json!({
                    "userName": "alice_01",
                    "email": "alice@example.com",
                    "password": "longenough",
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(set_cookies(&response).is_empty());

        // A stale cookie must not clobber the fresh one
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/auth/login",
                serde_json::json!({ "email": "alice@example.com", "password": "longenough" }),
                Some("stale"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].contains("HttpOnly"));
        assert!(cookies[0].contains("SameSite=Lax"));
        assert!(cookies[0].contains("Path=/"));
        let token = cookies[0]
            .trim_start_matches("session_token=")
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(request("GET", "/api/auth/status", Some(&token)))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["userName"], "alice_01");

        let response = app
            .clone()
            .oneshot(request("POST", "/api/auth/logout", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(set_cookies(&response)[0].contains("Max-Age=0"));
        assert_eq!(repo.session_count().await, 0);

        // Logout is idempotent
        let response = app
            .oneshot(request("POST", "/api/auth/logout", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_logout_storage_failure_is_reported() {
        let (repo, token) = logged_in().await;
        repo.set_failing(true);

        let response = app(&repo)
            .oneshot(request("POST", "/api/auth/logout", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].contains("Max-Age=0"));
        let body = body_string(response).await;
        assert!(body.contains("Internal server error"));

        // The session survived, so a 204 would have lied
        repo.set_failing(false);
        let still_live = SessionManager::new(repo.clone(), Arc::new(AuthConfig::development()))
            .try_validate(&token)
            .await
            .unwrap();
        assert!(still_live.is_some());
    }

    #[tokio::test]
    async fn test_bad_login_is_generic_401() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        repo.insert_user("alice", "alice@example.com", "password-123")
            .await;

        let response = app(&repo)
            .oneshot(json_request(
                "/api/auth/login",
                serde_json::json!({ "email": "alice@example.com", "password": "nope-nope" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response).is_empty());
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["detail"], "Invalid email or password");
    }
}
