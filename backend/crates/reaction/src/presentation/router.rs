//! Reaction Routers
//!
//! Toggles are protected; mount them on the protected side of
//! [`auth::AuthGate::apply`].

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::ReactionConfig;
use crate::domain::repository::ReactionRepository;
use crate::presentation::handlers::{self, ReactionAppState};

/// Read-only routes
pub fn reaction_public_router<R>(repo: Arc<R>, config: Arc<ReactionConfig>) -> Router
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/reactions/{kind}/{id}", get(handlers::get_reactions::<R>))
        .with_state(ReactionAppState { repo, config })
}

/// Toggle routes (require a logged-in user)
pub fn reaction_protected_router<R>(repo: Arc<R>, config: Arc<ReactionConfig>) -> Router
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/like-post", post(handlers::like_post::<R>))
        .route("/dislike-post", post(handlers::dislike_post::<R>))
        .route("/like-comment", post(handlers::like_comment::<R>))
        .route("/dislike-comment", post(handlers::dislike_comment::<R>))
        .with_state(ReactionAppState { repo, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    use auth::infra::memory::InMemoryAuthRepository;
    use auth::{AuthConfig, AuthGate, SessionManager};
    use kernel::id::{CommentId, PostId};

    use crate::domain::model::Subject;
    use crate::infra::memory::InMemoryReactionRepository;

    struct TestApp {
        router: Router,
        token: String,
    }

    async fn app() -> TestApp {
        let auth_repo = Arc::new(InMemoryAuthRepository::new());
        let auth_config = Arc::new(AuthConfig::development());
        let user_id = auth_repo
            .insert_user("alice", "alice@example.com", "password-123")
            .await;
        let token = SessionManager::new(auth_repo.clone(), auth_config.clone())
            .issue(user_id)
            .await
            .unwrap()
            .token;

        let reactions = Arc::new(InMemoryReactionRepository::with_subjects([
            Subject::Post(PostId::new(1)),
            Subject::Comment(CommentId::new(2)),
        ]));
        let config = Arc::new(ReactionConfig::default());

        let router = AuthGate::new(auth_repo, auth_config).apply(
            reaction_public_router(reactions.clone(), config.clone()),
            reaction_protected_router(reactions, config),
        );

        TestApp { router, token }
    }

    impl TestApp {
        async fn call(&self, method: &str, uri: &str, logged_in: bool) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if logged_in {
                builder = builder.header(header::COOKIE, format!("session_token={}", self.token));
            }
            self.router
                .clone()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_like_and_dislike() {
        let app = app().await;

        let response = app.call("POST", "/like-post?id=1", true).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["stance"], "like");
        assert_eq!(body["likes"], 1);
        assert_eq!(body["dislikes"], 0);

        let body = json(app.call("POST", "/dislike-post?id=1", true).await).await;
        assert_eq!(body["stance"], "dislike");
        assert_eq!(body["likes"], 0);
        assert_eq!(body["dislikes"], 1);

        let body = json(app.call("POST", "/dislike-post?id=1", true).await).await;
        assert!(body["stance"].is_null());
        assert_eq!(body["dislikes"], 0);
    }

    #[tokio::test]
    async fn test_comment_toggle_and_read() {
        let app = app().await;

        app.call("POST", "/like-comment?id=2", true).await;

        let body = json(app.call("GET", "/api/reactions/comment/2", true).await).await;
        assert_eq!(body["likes"], 1);
        assert_eq!(body["stance"], "like");

        let body = json(app.call("GET", "/api/reactions/comment/2", false).await).await;
        assert_eq!(body["likes"], 1);
        assert!(body["stance"].is_null());
    }

    #[tokio::test]
    async fn test_bad_ids_are_rejected() {
        let app = app().await;

        for uri in ["/like-post", "/like-post?id=", "/like-post?id=abc", "/dislike-comment?id=-1"] {
            let response = app.call("POST", uri, true).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }

        let response = app.call("GET", "/api/reactions/user/1", false).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_404() {
        let app = app().await;
        let response = app.call("POST", "/like-post?id=99", true).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_toggle_redirects_to_login() {
        let app = app().await;
        let response = app.call("POST", "/like-post?id=1", false).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}
