//! Get Reactions Use Case
//!
//! Counts for a subject, plus the caller's own stance when logged in.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::model::{ReactionCounts, ReactionState, Subject};
use crate::domain::repository::ReactionRepository;
use crate::error::ReactionResult;

#[derive(Debug, Clone, Copy)]
pub struct ReactionSummary {
    pub counts: ReactionCounts,
    pub state: ReactionState,
}

pub struct GetReactionsUseCase<R>
where
    R: ReactionRepository,
{
    repo: Arc<R>,
}

impl<R> GetReactionsUseCase<R>
where
    R: ReactionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        subject: Subject,
        viewer: Option<UserId>,
    ) -> ReactionResult<ReactionSummary> {
        let counts = self.repo.counts(subject).await?;
        let state = match viewer {
            Some(user_id) => self.repo.state_of(subject, user_id).await?,
            None => ReactionState::Absent,
        };
        Ok(ReactionSummary { counts, state })
    }
}
