// Authentication and authorization error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::error::{ErrorResponse, StoreError, UniqueField};
use crate::roles::RoleCode;

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Input errors
    #[error("Request validation failed")]
    ValidationError(validator::ValidationErrors),
    /// Body is not JSON or does not match the request shape
    #[error("Request validation failed")]
    MalformedBody(String),
    #[error("User with this email already exists")]
    EmailAlreadyExists,
    #[error("Username already taken")]
    UsernameAlreadyExists,

    // Authentication errors
    /// Unknown username and wrong password are deliberately the same error
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid or expired token")]
    ExpiredToken,

    // Authorization errors
    /// Valid identity whose role is outside the allowed set
    #[error("Insufficient permissions: role '{actual}' is not in {allowed:?}")]
    InsufficientPermissions {
        allowed: Vec<RoleCode>,
        actual: RoleCode,
    },

    /// Token subject no longer resolves to a user
    #[error("User not found")]
    UserNotFound,

    // Server-side faults
    /// Seed data missing, e.g. the default role
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
    #[error(transparent)]
    Store(StoreError),
}

/// Unique constraint violations from the store are the authoritative conflict signal
impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation(UniqueField::Email) => AuthError::EmailAlreadyExists,
            StoreError::UniqueViolation(UniqueField::Username) => AuthError::UsernameAlreadyExists,
            other => AuthError::Store(other),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::MalformedBody(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(errors)
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_)
            | AuthError::MalformedBody(_)
            | AuthError::EmailAlreadyExists
            | AuthError::UsernameAlreadyExists => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::ConfigError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::InsufficientPermissions { .. } => "Insufficient permissions".to_string(),
            AuthError::ConfigError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ErrorResponse::new(self.error_message());

        match &self {
            AuthError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                body = body.with_details(
                    serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                );
            }
            AuthError::MalformedBody(reason) => {
                debug!("Malformed request body: {}", reason);
                body = body.with_details(serde_json::json!({ "body": reason }));
            }
            AuthError::EmailAlreadyExists | AuthError::UsernameAlreadyExists => {
                warn!("Registration conflict: {}", self);
            }
            AuthError::InvalidCredentials => warn!("Failed login attempt"),
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::InvalidToken => warn!("Invalid token attempt"),
            AuthError::ExpiredToken => warn!("Expired token attempt"),
            AuthError::InsufficientPermissions { allowed, actual } => {
                warn!(
                    "Authorization failed: role '{}' not in allowed roles {:?}",
                    actual, allowed
                );
            }
            AuthError::UserNotFound => debug!("Token subject no longer exists"),
            AuthError::ConfigError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::Store(_) => {
                error!("Auth server error: {}", self);
                body = body.with_internal_detail(&self);
            }
        }

        body.into_response_with(status)
    }
}
