//! Server configuration
//!
//! Read from the environment (after `.env` is loaded). Parsing goes through
//! a lookup function so it can be tested without touching process state.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::application::config::SameSite;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout: Duration,
    pub session_sweep_interval: Duration,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let session_ttl_hours: u64 = parse_or(&get, "SESSION_TTL_HOURS", 24)?;
        if session_ttl_hours == 0 || session_ttl_hours > MAX_SESSION_TTL_HOURS {
            bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}");
        }
        let session_ttl_secs = session_ttl_hours
            .checked_mul(3600)
            .context("SESSION_TTL_HOURS is too large")?;
        let sweep_secs: u64 = parse_or(&get, "SESSION_SWEEP_INTERVAL_SECS", 3600)?;
        if sweep_secs == 0 {
            bail!("SESSION_SWEEP_INTERVAL_SECS must be positive");
        }

        let auth = AuthConfig {
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "session_token".to_string()),
            session_ttl: Duration::from_secs(session_ttl_secs),
            cookie_secure: parse_or(&get, "COOKIE_SECURE", false)?,
            cookie_same_site: SameSite::Lax,
            login_path: get("LOGIN_PATH").unwrap_or_else(|| "/login".to_string()),
            password_pepper: get("PASSWORD_PEPPER").map(String::into_bytes),
        };

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            db_statement_timeout: Duration::from_millis(parse_or(
                &get,
                "DB_STATEMENT_TIMEOUT_MS",
                5000,
            )?),
            session_sweep_interval: Duration::from_secs(sweep_secs),
            frontend_origins,
            auth,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
