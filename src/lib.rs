// Portal API
// Registration, login and role-filtered navigation menus for the banking portal

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod menus;
pub mod roles;
pub mod seed;
pub mod session;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{
    authenticate, login_handler, me_handler, register_handler, AuthService, PasswordService,
    RequireRole, TokenService,
};
use crate::db::Repositories;
use crate::error::{apply_error_detail_policy, route_not_found, ErrorDetailPolicy};
use crate::menus::{menus_handler, MenuService};
use crate::roles::{list_roles_handler, RoleRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        menus::handlers::menus_handler,
        roles::handlers::list_roles_handler,
    ),
    components(
        schemas(
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::AuthResponse,
            auth::models::UserResponse,
            auth::models::CurrentUserResponse,
            menus::models::MenuIcon,
            menus::models::MenuNode,
            menus::models::MenuListResponse,
            roles::models::Role,
            roles::models::RoleCode,
            roles::handlers::RoleListResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Current user profile"),
        (name = "menus", description = "Role-filtered navigation"),
        (name = "roles", description = "Role reference data")
    ),
    info(
        title = "Portal API",
        version = "1.0.0",
        description = "Role-based banking portal: authentication and navigation menus"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub menu_service: Arc<MenuService>,
    pub roles: Arc<dyn RoleRepository>,
    pub tokens: Arc<TokenService>,
    pub error_details: ErrorDetailPolicy,
}

impl AppState {
    pub fn new(repos: &Repositories, passwords: PasswordService, tokens: Arc<TokenService>) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(
                repos.users.clone(),
                repos.roles.clone(),
                passwords,
                tokens.clone(),
            )),
            menu_service: Arc::new(MenuService::new(repos.menus.clone(), repos.roles.clone())),
            roles: repos.roles.clone(),
            tokens,
            error_details: ErrorDetailPolicy::default(),
        }
    }

    /// Send internal fault details to clients (non-production deployments)
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.error_details = ErrorDetailPolicy { expose };
        self
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

async fn banner() -> &'static str {
    "Portal API is running"
}

/// CORS policy: any origin, or a single client origin with credentials
pub fn cors_layer(client_url: Option<&str>) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let cors = match client_url {
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origin) => CorsLayer::new()
            .allow_origin(HeaderValue::from_str(origin)?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    };
    Ok(cors)
}

/// Creates and configures the application router
///
/// Everything but the banner and the docs lives under `/api`. Protected
/// routes run the authenticate stage first; `/api/roles` additionally
/// requires the admin role.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let admin_only = RequireRole::admin();
    let admin_routes = Router::new()
        .route("/roles", get(list_roles_handler))
        .route_layer(middleware::from_fn(move |request: Request, next: Next| {
            admin_only.clone().middleware(request, next)
        }));

    let protected = Router::new()
        .route("/users/me", get(me_handler))
        .route("/menus", get(menus_handler))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .merge(protected);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(banner))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.error_details,
            apply_error_detail_policy,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests;
