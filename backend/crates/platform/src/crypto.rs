//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Session token entropy in bytes (256 bits)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Token generation failure (entropy source unavailable)
#[derive(Debug, Error)]
#[error("Secure random source unavailable: {0}")]
pub struct TokenError(#[from] rand::Error);

/// Fill a buffer from the OS entropy source
///
/// Fails instead of falling back to a weaker generator.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, TokenError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// Generate an opaque session token (URL-safe base64, no padding)
pub fn generate_session_token() -> Result<String, TokenError> {
    let bytes = random_bytes(SESSION_TOKEN_BYTES)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, non-reversible token label for log lines
pub fn token_fingerprint(token: &str) -> String {
    sha256(token.as_bytes())[..6]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
