//! Toggle state machine
//!
//! | current  | action        | next     | write           |
//! |----------|---------------|----------|-----------------|
//! | Absent   | ToggleLike    | Liked    | insert(like)    |
//! | Liked    | ToggleLike    | Absent   | delete          |
//! | Disliked | ToggleLike    | Liked    | update(like)    |
//! | Absent   | ToggleDislike | Disliked | insert(dislike) |
//! | Disliked | ToggleDislike | Absent   | delete          |
//! | Liked    | ToggleDislike | Disliked | update(dislike) |

use crate::domain::model::{ReactionState, Stance, ToggleAction};

/// Row operation that moves storage to the next state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Insert(Stance),
    Update(Stance),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReactionState,
    pub write: Write,
}

pub fn transition(current: ReactionState, action: ToggleAction) -> Transition {
    let wanted = action.stance();
    match current.stance() {
        None => Transition {
            next: target(wanted),
            write: Write::Insert(wanted),
        },
        Some(held) if held == wanted => Transition {
            next: ReactionState::Absent,
            write: Write::Delete,
        },
        Some(_) => Transition {
            next: target(wanted),
            write: Write::Update(wanted),
        },
    }
}

fn target(stance: Stance) -> ReactionState {
    match stance {
        Stance::Like => ReactionState::Liked,
        Stance::Dislike => ReactionState::Disliked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReactionState::*;
    use ToggleAction::*;

    #[test]
    fn test_transition_table() {
        let table = [
            (Absent, ToggleLike, Liked, Write::Insert(Stance::Like)),
            (Liked, ToggleLike, Absent, Write::Delete),
            (Disliked, ToggleLike, Liked, Write::Update(Stance::Like)),
            (Absent, ToggleDislike, Disliked, Write::Insert(Stance::Dislike)),
            (Disliked, ToggleDislike, Absent, Write::Delete),
            (Liked, ToggleDislike, Disliked, Write::Update(Stance::Dislike)),
        ];

        for (current, action, next, write) in table {
            assert_eq!(
                transition(current, action),
                Transition { next, write },
                "{current:?} + {action:?}"
            );
        }
    }

    #[test]
    fn test_same_action_twice_is_identity() {
        for start in [Absent, Liked, Disliked] {
            for action in [ToggleLike, ToggleDislike] {
                let once = transition(start, action).next;
                let twice = transition(once, action).next;
                if start.stance() == Some(action.stance()) || start == Absent {
                    assert_eq!(twice, start);
                }
            }
        }
    }
}
