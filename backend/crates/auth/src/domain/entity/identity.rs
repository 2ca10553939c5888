//! Request Identity
//!
//! Attached to every request by the identity-resolution middleware.

use kernel::id::UserId;
use serde::Serialize;

/// Authenticated user carried by a live session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    pub user_name: String,
}

/// Who is making the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    LoggedIn(SessionUser),
}

impl Identity {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Identity::LoggedIn(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Identity::LoggedIn(user) => Some(user),
            Identity::Anonymous => None,
        }
    }
}

impl From<Option<SessionUser>> for Identity {
    fn from(user: Option<SessionUser>) -> Self {
        user.map_or(Identity::Anonymous, Identity::LoggedIn)
    }
}
