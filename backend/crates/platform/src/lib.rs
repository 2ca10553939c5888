//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Session token generation and hashing helpers (OS RNG, SHA-256)
//! - Password hashing (Argon2id) with a dummy verification path
//! - Session cookie construction and parsing

pub mod cookie;
pub mod crypto;
pub mod password;
