//! Toggle Reaction Use Case

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::ReactionConfig;
use crate::domain::model::{ReactionCounts, ReactionState, Subject, ToggleAction, Toggled};
use crate::domain::repository::ReactionRepository;
use crate::error::{ReactionError, ReactionResult};

#[derive(Debug, Clone, Copy)]
pub struct ToggleOutput {
    pub state: ReactionState,
    pub counts: ReactionCounts,
}

pub struct ToggleReactionUseCase<R>
where
    R: ReactionRepository,
{
    repo: Arc<R>,
    config: Arc<ReactionConfig>,
}

impl<R> ToggleReactionUseCase<R>
where
    R: ReactionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ReactionConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        subject: Subject,
        user_id: UserId,
        action: ToggleAction,
    ) -> ReactionResult<ToggleOutput> {
        let mut retries_left = self.config.max_conflict_retries;

        let Toggled { state, counts } = loop {
            match self.repo.toggle(subject, user_id, action).await {
                Ok(toggled) => break toggled,
                Err(ReactionError::Conflict) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::debug!(
                        subject = %subject,
                        user_id = %user_id,
                        "Retrying reaction toggle"
                    );
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            subject = %subject,
            user_id = %user_id,
            action = ?action,
            state = ?state,
            likes = counts.likes,
            dislikes = counts.dislikes,
            "Reaction toggled"
        );

        Ok(ToggleOutput { state, counts })
    }
}
