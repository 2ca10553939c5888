//! Domain Layer

pub mod model;
pub mod repository;
pub mod services;

pub use model::{ReactionCounts, ReactionState, Stance, Subject, SubjectKind, ToggleAction};
pub use repository::ReactionRepository;
pub use services::{Transition, Write, transition};
