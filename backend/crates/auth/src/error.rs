//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordPolicy, PasswordViolation};
use thiserror::Error;

use crate::application::token::TokenError;
use crate::domain::value_object::user_name::UserNameError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body missing, not JSON, or of the wrong shape
    #[error("Invalid request body")]
    MalformedBody,

    /// Candidate password breaks one or more composition rules
    #[error("Password requirements: {}", requirements(.0))]
    PasswordPolicy(Vec<PasswordViolation>),

    /// User name failed validation
    #[error("Invalid user name: {0}")]
    InvalidUserName(UserNameError),

    /// User name already exists
    #[error("User name already exists")]
    UserNameTaken,

    /// Unknown user name or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session token presented
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Token failed decryption, signature or expiry checks.
    /// The cause is logged, never rendered.
    #[error("Invalid or expired token")]
    SessionInvalid(TokenError),

    /// Authenticated but not privileged
    #[error("User isn't a worm")]
    InsufficientPrivilege,

    /// Identity behind a valid token no longer exists
    #[error("User not found")]
    IdentityNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error; the message is shown to clients
    #[error("{0}")]
    Internal(String),
}

fn requirements(violations: &[PasswordViolation]) -> String {
    let policy = PasswordPolicy::default();
    violations
        .iter()
        .map(|v| policy.describe(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MalformedBody
            | AuthError::PasswordPolicy(_)
            | AuthError::InvalidUserName(_) => ErrorKind::BadRequest,
            AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::NotAuthenticated
            | AuthError::SessionInvalid(_) => ErrorKind::Unauthorized,
            AuthError::InsufficientPrivilege => ErrorKind::Forbidden,
            AuthError::IdentityNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::PasswordPolicy(violations) => AppError::bad_request(self.to_string())
                .with_details(violations.iter().map(|v| v.code())),
            AuthError::Database(_) => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Replace an infrastructure failure with a client-facing message
    ///
    /// The original cause is logged here. Domain errors pass through.
    pub fn or_internal(self, message: &'static str) -> Self {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, context = message, "Auth database error");
                AuthError::Internal(message.to_string())
            }
            AuthError::Internal(detail) => {
                tracing::error!(detail = %detail, context = message, "Auth internal error");
                AuthError::Internal(message.to_string())
            }
            other => other,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionInvalid(cause) => {
                tracing::warn!(cause = %cause, "Session token rejected");
            }
            AuthError::InsufficientPrivilege => {
                tracing::warn!("Privileged route refused");
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

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::InvalidUserName(err)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::SessionInvalid(err)
    }
}
