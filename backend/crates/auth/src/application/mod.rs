//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod session_manager;
pub mod sign_in;
pub mod sign_up;
pub mod sweeper;

// Re-exports
pub use config::AuthConfig;
pub use session_manager::SessionManager;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use sweeper::spawn_session_sweeper;
