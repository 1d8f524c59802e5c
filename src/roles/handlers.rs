// HTTP handlers for role endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse};
use crate::roles::models::Role;
use crate::AppState;

/// Role list envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Role>,
}

/// List all roles (admin only)
/// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "All roles", body = RoleListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn list_roles_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<RoleListResponse>, ApiError> {
    tracing::debug!("Listing roles for user_id={}", user.user_id);

    let roles = state.roles.list().await?;

    Ok(Json(RoleListResponse {
        success: true,
        message: "Roles retrieved successfully".to_string(),
        data: roles,
    }))
}
