//! Application Layer

pub mod config;
pub mod get_reactions;
pub mod toggle;

pub use config::ReactionConfig;
pub use get_reactions::{GetReactionsUseCase, ReactionSummary};
pub use toggle::{ToggleOutput, ToggleReactionUseCase};
