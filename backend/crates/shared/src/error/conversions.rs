//! Error conversions - database error inspection and HTTP rendering
//!
//! Repositories use the SQLSTATE helpers to turn constraint violations into
//! domain errors; every router renders [`AppError`] through `IntoResponse`.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// SQLSTATE inspection (feature-gated)
// ============================================================================

/// PostgreSQL SQLSTATE: unique_violation
#[cfg(feature = "sqlx")]
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE: foreign_key_violation
#[cfg(feature = "sqlx")]
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQLSTATE を取り出す（DB エラー以外は `None`）
#[cfg(feature = "sqlx")]
pub fn pg_error_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// 一意制約違反かどうか
#[cfg(feature = "sqlx")]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    pg_error_code(err).as_deref() == Some(PG_UNIQUE_VIOLATION)
}

/// 外部キー制約違反かどうか
#[cfg(feature = "sqlx")]
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    pg_error_code(err).as_deref() == Some(PG_FOREIGN_KEY_VIOLATION)
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            match std::error::Error::source(&self) {
                Some(source) => {
                    tracing::error!(message = %self.message(), error = %source, "Server error")
                }
                None => tracing::error!(message = %self.message(), "Server error"),
            }
        }

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "code": self.kind(),
            "status": self.status_code(),
            "detail": self.public_message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}
