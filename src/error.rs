//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//!
//! # Taxonomy
//!
//! Credential failures collapse into two wire-visible classes:
//!
//! - `Unauthenticated` (401): missing, garbled, forged, expired, or revoked
//!   credential. The wire message never says which, so callers cannot probe
//!   whether a key exists, is expired, or was revoked. Internal logs keep the
//!   distinction for abuse detection.
//! - `Forbidden` (403): a credential that verified correctly but was used
//!   against a tenant it does not belong to.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::TokenError;
use crate::security::CipherError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and a stable error code
/// in the response body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (connection error, query error).
    ///
    /// Details are logged server-side and hidden from the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No credential, a garbled credential, or a credential that failed
    /// verification (bad signature, expired, revoked, unknown hash).
    ///
    /// Returns HTTP 401 Unauthorized with a deliberately generic message.
    #[error("invalid or missing credentials")]
    Unauthenticated,

    /// A well-formed, verified credential used against a tenant it does not
    /// belong to. Returns HTTP 403 Forbidden.
    #[error("access denied")]
    Forbidden,

    /// Requested resource does not exist or is not visible to the caller.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("resource not found")]
    NotFound,

    /// Uniqueness violation on create (duplicate email, client name).
    ///
    /// Returns HTTP 409 Conflict.
    #[error("{0}")]
    Conflict(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    Validation(String),

    /// Unexpected internal failure (crypto, serialization, upstream call).
    ///
    /// Returns HTTP 500 with a generic body.
    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Map a unique-constraint violation on insert to a 409 with `message`;
    /// any other database error stays a generic 500.
    ///
    /// Pre-insert existence checks give friendly errors on the common path,
    /// but a concurrent duplicate can still land on the constraint itself.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(message.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

/// Token verification failures are all 401s on the wire, but the kind is
/// logged first: a burst of `Expired` looks very different from a burst of
/// `InvalidSignature` when hunting abuse.
impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        tracing::debug!(kind = %err, "token verification failed");
        AppError::Unauthenticated
    }
}

/// Decryption failures never reveal whether the key was wrong or the data
/// tampered, internally or on the wire.
impl From<CipherError> for AppError {
    fn from(err: CipherError) -> Self {
        tracing::error!(kind = %err, "cipher operation failed");
        AppError::Internal
    }
}

/// Convert AppError into an HTTP response.
///
/// All errors return a flat JSON body:
///
/// ```json
/// {
///   "error": "access denied",
///   "code": "FORBIDDEN"
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_maps_to_401() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn token_errors_collapse_to_unauthenticated() {
        for err in [
            TokenError::Expired,
            TokenError::InvalidSignature,
            TokenError::Malformed,
        ] {
            assert!(matches!(AppError::from(err), AppError::Unauthenticated));
        }
    }

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("stub database error")
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub database error"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn concurrent_unique_violation_becomes_conflict() {
        let err = sqlx::Error::Database(Box::new(StubDbError { unique: true }));
        let mapped = AppError::conflict_on_unique(err, "email already registered");
        assert!(matches!(mapped, AppError::Conflict(ref msg) if msg == "email already registered"));
        assert_eq!(mapped.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = sqlx::Error::Database(Box::new(StubDbError { unique: false }));
        let mapped = AppError::conflict_on_unique(err, "email already registered");
        assert!(matches!(mapped, AppError::Database(_)));
        assert_eq!(
            mapped.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
