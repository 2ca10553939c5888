//! User Entity
//!
//! The slice of a forum account the auth core reads and writes.

use kernel::id::UserId;

use crate::domain::value_object::{email::Email, user_name::UserName, user_password::UserPassword};

/// Stored account, as returned by credential lookups
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    /// Display name as entered at registration
    pub user_name: String,
    pub email: Email,
    pub password_hash: UserPassword,
}

/// Account about to be inserted (ID assigned by the store)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: Email,
    pub password_hash: UserPassword,
}
