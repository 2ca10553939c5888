//! Reaction Backend Module
//!
//! Like / dislike toggles on posts and comments.
//!
//! - `domain/` - Subjects, stances, the toggle state machine
//! - `application/` - Toggle and read use cases
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers and routers
//!
//! A user holds at most one reaction per subject. Counts are always derived
//! from the stored rows, never kept as separate counters.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::ReactionConfig;
pub use error::{ReactionError, ReactionResult};
pub use infra::postgres::PgReactionRepository;
pub use presentation::router::{reaction_protected_router, reaction_public_router};
