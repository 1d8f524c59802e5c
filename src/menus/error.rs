// Menu resolution error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::error::{ErrorResponse, StoreError};
use crate::roles::RoleCode;

#[derive(Debug, Error)]
pub enum MenuError {
    /// The caller's role has no record in the store; a deployment fault
    #[error("Role '{0}' not found")]
    RoleNotFound(RoleCode),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MenuError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        error!("Menu resolution failed: {}", self);
        let message = match &self {
            MenuError::RoleNotFound(_) => "Role not found",
            MenuError::Store(_) => "Internal server error",
        };

        ErrorResponse::new(message)
            .with_internal_detail(&self)
            .into_response_with(self.status_code())
    }
}
