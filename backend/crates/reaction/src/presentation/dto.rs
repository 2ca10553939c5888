//! API DTOs

use serde::{Deserialize, Serialize};

use crate::application::{ReactionSummary, ToggleOutput};
use crate::domain::model::Stance;

/// `?id=N` on the toggle endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectQuery {
    pub id: Option<String>,
}

/// Toggle result and the subject's counts after it
#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub stance: Option<Stance>,
    pub likes: i64,
    pub dislikes: i64,
}

impl From<ToggleOutput> for ReactionResponse {
    fn from(out: ToggleOutput) -> Self {
        Self {
            stance: out.state.stance(),
            likes: out.counts.likes,
            dislikes: out.counts.dislikes,
        }
    }
}

impl From<ReactionSummary> for ReactionResponse {
    fn from(summary: ReactionSummary) -> Self {
        Self {
            stance: summary.state.stance(),
            likes: summary.counts.likes,
            dislikes: summary.counts.dislikes,
        }
    }
}
