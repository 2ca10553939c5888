//! Repository Traits

use kernel::id::UserId;

use crate::domain::model::{ReactionCounts, ReactionState, Subject, ToggleAction, Toggled};
use crate::error::ReactionResult;

#[trait_variant::make(ReactionRepository: Send)]
pub trait LocalReactionRepository {
    /// Apply one toggle in a single transaction
    ///
    /// Reads the current row under lock, computes the transition, writes it
    /// and reads the subject's counts before committing. Nothing is persisted
    /// on error. A lost race on the primary key surfaces as
    /// `ReactionError::Conflict`.
    async fn toggle(
        &self,
        subject: Subject,
        user_id: UserId,
        action: ToggleAction,
    ) -> ReactionResult<Toggled>;

    async fn counts(&self, subject: Subject) -> ReactionResult<ReactionCounts>;

    async fn state_of(&self, subject: Subject, user_id: UserId) -> ReactionResult<ReactionState>;
}
