// Error handling shared across the portal API
// Provides the JSON error envelope, store-level errors and cross-cutting API errors

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Whether 500-class responses carry the internal error detail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorDetailPolicy {
    pub expose: bool,
}

/// Internal fault detail riding on an error response until
/// [`apply_error_detail_policy`] decides whether the client sees it
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// Consistent error response structure
///
/// Every failed request is answered with this envelope:
/// `{"success": false, "message": "..."}` plus optional field-level
/// `details` (validation) and an optional `error` detail (server faults,
/// non-production only).
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false for error responses
    #[schema(example = false)]
    pub success: bool,

    /// Human-readable error message
    #[schema(example = "Invalid credentials")]
    pub message: String,

    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// Internal error detail, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip)]
    internal_detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
            error: None,
            internal_detail: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Record an internal error detail; the router's policy decides if it is sent
    pub fn with_internal_detail(mut self, detail: impl fmt::Display) -> Self {
        self.internal_detail = Some(detail.to_string());
        self
    }

    pub fn into_response_with(mut self, status: StatusCode) -> Response {
        let internal_detail = self.internal_detail.take();
        let mut response = (status, Json(self)).into_response();
        if let Some(detail) = internal_detail {
            response.extensions_mut().insert(InternalErrorDetail(detail));
        }
        response
    }
}

/// Unique constraints enforced by the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    RoleCode,
    MenuKey,
    RoleMenu,
}

impl UniqueField {
    /// Map a database constraint (or unique index) name to the field it guards
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_email_key" => Some(Self::Email),
            "users_username_key" => Some(Self::Username),
            "roles_code_key" => Some(Self::RoleCode),
            "menus_key_key" => Some(Self::MenuKey),
            "role_menus_role_id_menu_id_key" => Some(Self::RoleMenu),
            _ => None,
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::RoleCode => "role code",
            Self::MenuKey => "menu key",
            Self::RoleMenu => "role/menu pair",
        };
        f.write_str(name)
    }
}

/// Errors raised by the credential store (PostgreSQL or in-memory)
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with a unique constraint
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    /// A record references missing data or holds a value outside its closed set
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Convert an insert failure, recognising unique constraint violations
    pub fn from_insert(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation() {
                if let Some(field) = db_err.constraint().and_then(UniqueField::from_constraint) {
                    return Self::UniqueViolation(field);
                }
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidRecord(db_err.message().to_string());
            }
        }
        Self::Database(error)
    }
}

/// Cross-cutting API errors not owned by a feature module
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Route not found")]
    RouteNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RouteNotFound => {
                debug!("Unmatched route requested");
                ErrorResponse::new("Route not found").into_response_with(StatusCode::NOT_FOUND)
            }
            ApiError::Store(store_error) => {
                error!("Store error: {:?}", store_error);
                ErrorResponse::new("Internal server error")
                    .with_internal_detail(&store_error)
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Copy the internal fault detail into the `error` field when the policy allows it
pub async fn apply_error_detail_policy(
    State(policy): State<ErrorDetailPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !policy.expose {
        return response;
    }
    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to buffer error response: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(mut envelope)) => {
            envelope.insert("error".to_string(), serde_json::Value::String(detail));
            serde_json::to_vec(&envelope).map(Body::from).unwrap_or_else(|_| Body::from(bytes))
        }
        _ => Body::from(bytes),
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, body)
}

/// Fallback handler for unmatched routes
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_omits_empty_fields() {
        let json = serde_json::to_value(ErrorResponse::new("Route not found")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "Route not found"}));
    }

    #[test]
    fn test_unique_field_from_constraint() {
        assert_eq!(UniqueField::from_constraint("users_email_key"), Some(UniqueField::Email));
        assert_eq!(UniqueField::from_constraint("users_username_key"), Some(UniqueField::Username));
        assert_eq!(UniqueField::from_constraint("something_else"), None);
    }

    async fn failing() -> ApiError {
        ApiError::Store(StoreError::InvalidRecord("menu 7 has unknown icon 'Rocket'".to_string()))
    }

    fn detail_app(expose: bool) -> axum::Router {
        axum::Router::new()
            .route("/fail", axum::routing::get(failing))
            .fallback(route_not_found)
            .layer(axum::middleware::from_fn_with_state(
                ErrorDetailPolicy { expose },
                apply_error_detail_policy,
            ))
    }

    async fn body_of(app: axum::Router, uri: &str) -> serde_json::Value {
        use tower::ServiceExt;

        let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden_by_default() {
        let body = body_of(detail_app(false), "/fail").await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_internal_detail_is_exposed_when_allowed() {
        let body = body_of(detail_app(true), "/fail").await;
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["error"], "invalid record: menu 7 has unknown icon 'Rocket'");

        // Client errors carry no internal detail either way
        let missing = body_of(detail_app(true), "/nowhere").await;
        assert!(missing.get("error").is_none());
    }

    #[test]
    fn test_route_not_found_status() {
        let response = ApiError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
