//! Reaction Model

use std::fmt;
use std::str::FromStr;

use kernel::id::{CommentId, PostId};
use serde::Serialize;

use crate::error::ReactionError;

/// Kind of thing being reacted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Post,
    Comment,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Post => "post",
            SubjectKind::Comment => "comment",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = ReactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" | "posts" => Ok(SubjectKind::Post),
            "comment" | "comments" => Ok(SubjectKind::Comment),
            other => Err(ReactionError::InvalidSubject(format!(
                "unknown subject kind '{other}'"
            ))),
        }
    }
}

/// A post or a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Post(PostId),
    Comment(CommentId),
}

impl Subject {
    /// Parse an untrusted id for the given kind
    pub fn parse(kind: SubjectKind, raw_id: &str) -> Result<Self, ReactionError> {
        Ok(match kind {
            SubjectKind::Post => Subject::Post(PostId::parse(raw_id)?),
            SubjectKind::Comment => Subject::Comment(CommentId::parse(raw_id)?),
        })
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Post(_) => SubjectKind::Post,
            Subject::Comment(_) => SubjectKind::Comment,
        }
    }

    /// Raw key for binding into queries
    pub fn id(&self) -> i64 {
        match self {
            Subject::Post(id) => id.get(),
            Subject::Comment(id) => id.get(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Like or dislike (`liked` column: true / false)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Like,
    Dislike,
}

impl Stance {
    pub fn liked(&self) -> bool {
        matches!(self, Stance::Like)
    }

    pub fn from_liked(liked: bool) -> Self {
        if liked { Stance::Like } else { Stance::Dislike }
    }
}

/// A user's reaction to one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionState {
    #[default]
    Absent,
    Liked,
    Disliked,
}

impl ReactionState {
    /// From the stored row, if any
    pub fn from_liked(liked: Option<bool>) -> Self {
        match liked {
            None => ReactionState::Absent,
            Some(true) => ReactionState::Liked,
            Some(false) => ReactionState::Disliked,
        }
    }

    pub fn stance(&self) -> Option<Stance> {
        match self {
            ReactionState::Absent => None,
            ReactionState::Liked => Some(Stance::Like),
            ReactionState::Disliked => Some(Stance::Dislike),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    ToggleLike,
    ToggleDislike,
}

impl ToggleAction {
    pub fn stance(&self) -> Stance {
        match self {
            ToggleAction::ToggleLike => Stance::Like,
            ToggleAction::ToggleDislike => Stance::Dislike,
        }
    }
}

/// Counts derived from the reaction rows of one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// Outcome of one committed toggle
///
/// `counts` is read in the same transaction as the write, so it already
/// includes this toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    pub state: ReactionState,
    pub counts: ReactionCounts,
}
