//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ReactionAppState;
pub use router::{reaction_protected_router, reaction_public_router};
