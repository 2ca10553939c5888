//! Entity Module

pub mod identity;
pub mod session;
pub mod user;

pub use identity::{Identity, SessionUser};
pub use session::{IssuedSession, Session, SessionLookup};
pub use user::{NewUser, UserRecord};
