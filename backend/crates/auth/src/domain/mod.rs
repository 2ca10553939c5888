//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Identity, IssuedSession, Session, SessionLookup, SessionUser, UserRecord};
pub use repository::{SessionRepository, UserRepository};
