//! Auth Error Types
//!
//! Auth-specific error variants integrating with the unified
//! `kernel::error::AppError` system. The variants are the wire contract:
//! every core outcome maps to exactly one HTTP status at the edge.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::InvalidAccountState;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Field validation failure or missing/malformed body
    #[error("{0}")]
    InvalidInput(String),

    /// Wrong username or password. One literal for both cases so that
    /// username enumeration via error messages is impossible.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, expired, or revoked token
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated but not allowed (authorization matrix, safety rules)
    #[error("{0}")]
    Forbidden(&'static str),

    /// Target resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate username or email
    #[error("{0}")]
    Conflict(String),

    /// The token-carried role no longer matches the persisted role
    #[error("Your session is outdated. Please login again to refresh your permissions.")]
    StaleSession,

    /// Account is locked out
    #[error("Account is locked")]
    Locked,

    /// Aggregate precondition failure
    #[error(transparent)]
    InvalidState(#[from] InvalidAccountState),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Denylist store error
    #[error("Denylist store error: {0}")]
    Denylist(#[from] redis::RedisError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) | AuthError::StaleSession => StatusCode::CONFLICT,
            AuthError::Locked => StatusCode::LOCKED,
            AuthError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Denylist(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::Conflict(_) | AuthError::StaleSession => ErrorKind::Conflict,
            AuthError::Locked => ErrorKind::Locked,
            AuthError::InvalidState(_) => ErrorKind::UnprocessableEntity,
            AuthError::Denylist(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level.
    ///
    /// Credential failures log no detail beyond the event itself: no
    /// usernames, no token material, no source chain.
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Denylist(e) => {
                tracing::error!(error = %e, "Token denylist store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Locked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::StaleSession => {
                tracing::warn!("Request with stale role claim");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidInput("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Forbidden("no").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AuthError::StaleSession.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::Locked.status_code(), StatusCode::LOCKED);
        assert_eq!(
            AuthError::InvalidState(InvalidAccountState("bad state")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_credentials_message_is_shared_literal() {
        // Unknown username and wrong password must be indistinguishable
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }

    #[test]
    fn test_invalid_state_carries_sentence() {
        let err = AuthError::InvalidState(InvalidAccountState(
            "SUPER_ADMIN accounts cannot be demoted.",
        ));
        assert_eq!(err.to_string(), "SUPER_ADMIN accounts cannot be demoted.");
    }
}
