// HTTP handlers for menu endpoints

use axum::{extract::State, Json};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ErrorResponse;
use crate::menus::{error::MenuError, models::MenuListResponse};
use crate::AppState;

/// Navigation tree for the caller's role
/// GET /api/menus
#[utoipa::path(
    get,
    path = "/api/menus",
    responses(
        (status = 200, description = "Accessible menu tree", body = MenuListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Role record missing", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "menus"
)]
pub async fn menus_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MenuListResponse>, MenuError> {
    let data = state.menu_service.resolve_accessible_menus(user.role).await?;

    Ok(Json(MenuListResponse {
        success: true,
        message: "Menus retrieved successfully".to_string(),
        data,
    }))
}
