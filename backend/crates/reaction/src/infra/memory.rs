//! In-memory repository for tests
//!
//! One mutex serializes toggles, which stands in for the row lock. Known
//! subjects stand in for the foreign keys.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use kernel::id::UserId;
use tokio::sync::Mutex;

use crate::domain::model::{ReactionCounts, ReactionState, Subject, ToggleAction, Toggled};
use crate::domain::repository::ReactionRepository;
use crate::domain::services::{Write, transition};
use crate::error::{ReactionError, ReactionResult};

#[derive(Default)]
struct State {
    subjects: HashSet<Subject>,
    rows: HashMap<(Subject, UserId), bool>,
}

impl State {
    fn counts(&self, subject: Subject) -> ReactionCounts {
        let mut counts = ReactionCounts::default();
        for ((s, _), liked) in &self.rows {
            if *s != subject {
                continue;
            }
            if *liked {
                counts.likes += 1;
            } else {
                counts.dislikes += 1;
            }
        }
        counts
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReactionRepository {
    state: Arc<Mutex<State>>,
    fail_writes: Arc<AtomicBool>,
    fail_counts: Arc<AtomicBool>,
    pending_conflicts: Arc<AtomicU32>,
}

impl InMemoryReactionRepository {
    pub fn with_subjects(subjects: impl IntoIterator<Item = Subject>) -> Self {
        let state = State {
            subjects: subjects.into_iter().collect(),
            rows: HashMap::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    /// Fail the write step of every toggle, after the transition is computed
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail the counts read that precedes commit, so the write is rolled back
    pub fn set_fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }

    /// Make the next `n` toggles lose a primary-key race
    pub fn inject_conflicts(&self, n: u32) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    pub async fn row_count(&self, subject: Subject) -> usize {
        let state = self.state.lock().await;
        state.rows.keys().filter(|(s, _)| *s == subject).count()
    }
}

impl ReactionRepository for InMemoryReactionRepository {
    async fn toggle(
        &self,
        subject: Subject,
        user_id: UserId,
        action: ToggleAction,
    ) -> ReactionResult<Toggled> {
        let mut state = self.state.lock().await;

        if !state.subjects.contains(&subject) {
            return Err(ReactionError::SubjectNotFound);
        }

        let conflicted = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if conflicted {
            return Err(ReactionError::Conflict);
        }

        let key = (subject, user_id);
        let current = ReactionState::from_liked(state.rows.get(&key).copied());
        let step = transition(current, action);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ReactionError::Storage(sqlx::Error::PoolClosed));
        }

        let previous = state.rows.get(&key).copied();
        match step.write {
            Write::Insert(stance) | Write::Update(stance) => {
                state.rows.insert(key, stance.liked());
            }
            Write::Delete => {
                state.rows.remove(&key);
            }
        }

        if self.fail_counts.load(Ordering::SeqCst) {
            // Roll back
            match previous {
                Some(liked) => state.rows.insert(key, liked),
                None => state.rows.remove(&key),
            };
            return Err(ReactionError::Storage(sqlx::Error::PoolClosed));
        }

        Ok(Toggled {
            state: step.next,
            counts: state.counts(subject),
        })
    }

    async fn counts(&self, subject: Subject) -> ReactionResult<ReactionCounts> {
        let state = self.state.lock().await;
        Ok(state.counts(subject))
    }

    async fn state_of(&self, subject: Subject, user_id: UserId) -> ReactionResult<ReactionState> {
        let state = self.state.lock().await;
        Ok(ReactionState::from_liked(
            state.rows.get(&(subject, user_id)).copied(),
        ))
    }
}
