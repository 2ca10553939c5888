//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use std::sync::Arc;

use auth::{CurrentUser, Identity, SessionUser};

use crate::application::{GetReactionsUseCase, ReactionConfig, ToggleReactionUseCase};
use crate::domain::model::{Subject, SubjectKind, ToggleAction};
use crate::domain::repository::ReactionRepository;
use crate::error::{ReactionError, ReactionResult};
use crate::presentation::dto::{ReactionResponse, SubjectQuery};

/// Shared state for reaction handlers
#[derive(Clone)]
pub struct ReactionAppState<R>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<ReactionConfig>,
}

fn subject_from_query(kind: SubjectKind, query: SubjectQuery) -> ReactionResult<Subject> {
    let raw = query
        .id
        .ok_or_else(|| ReactionError::InvalidSubject("missing id".to_string()))?;
    Subject::parse(kind, &raw)
}

async fn toggle<R>(
    state: ReactionAppState<R>,
    user: SessionUser,
    subject: Subject,
    action: ToggleAction,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let use_case = ToggleReactionUseCase::new(state.repo, state.config);

    // Detached so a client disconnect cannot abort the transaction
    let output =
        tokio::spawn(async move { use_case.execute(subject, user.user_id, action).await })
            .await??;

    Ok(Json(output.into()))
}

/// POST /like-post?id=N
pub async fn like_post<R>(
    State(state): State<ReactionAppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let subject = subject_from_query(SubjectKind::Post, query)?;
    toggle(state, user, subject, ToggleAction::ToggleLike).await
}

/// POST /dislike-post?id=N
pub async fn dislike_post<R>(
    State(state): State<ReactionAppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let subject = subject_from_query(SubjectKind::Post, query)?;
    toggle(state, user, subject, ToggleAction::ToggleDislike).await
}

/// POST /like-comment?id=N
pub async fn like_comment<R>(
    State(state): State<ReactionAppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let subject = subject_from_query(SubjectKind::Comment, query)?;
    toggle(state, user, subject, ToggleAction::ToggleLike).await
}

/// POST /dislike-comment?id=N
pub async fn dislike_comment<R>(
    State(state): State<ReactionAppState<R>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let subject = subject_from_query(SubjectKind::Comment, query)?;
    toggle(state, user, subject, ToggleAction::ToggleDislike).await
}

/// GET /api/reactions/{kind}/{id}
pub async fn get_reactions<R>(
    State(state): State<ReactionAppState<R>>,
    identity: Identity,
    Path((kind, id)): Path<(String, String)>,
) -> ReactionResult<Json<ReactionResponse>>
where
    R: ReactionRepository + Clone + Send + Sync + 'static,
{
    let subject = Subject::parse(kind.parse()?, &id)?;
    let viewer = identity.user().map(|u| u.user_id);

    let summary = GetReactionsUseCase::new(state.repo)
        .execute(subject, viewer)
        .await?;

    Ok(Json(summary.into()))
}
