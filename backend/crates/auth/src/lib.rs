//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the session manager
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, auth gate
//!
//! ## Features
//! - Registration and login with email + password
//! - Server-side sessions with cookie-based tokens, one per user
//! - Identity resolution on every request, authorization on protected routes
//! - Periodic sweep of expired sessions
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Unknown emails pay the same hash cost as wrong passwords
//! - Session lookup failures resolve to anonymous

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{SessionManager, spawn_session_sweeper};
pub use domain::entity::{Identity, SessionUser};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::CurrentUser;
pub use presentation::router::{AuthGate, auth_router};
