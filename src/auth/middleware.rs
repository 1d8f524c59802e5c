// Authentication and authorization middleware for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, token::TokenService};
use crate::roles::RoleCode;

/// Identity attached to the request by [`authenticate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub role: RoleCode,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}

/// Extract the bearer token from the Authorization header.
/// A missing header, a non-Bearer scheme or an empty token all mean no
/// credentials were presented.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Authenticate stage: verify the bearer token and attach the identity to the request
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let token = bearer_token(request.headers()).map_err(|e| {
        warn!("No bearer token for protected endpoint: {}", endpoint);
        e
    })?;
    let claims = tokens.verify(token)?;

    let user = AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role,
    };
    debug!(
        "Authenticated user_id={}, role={}, endpoint={}",
        user.user_id, user.role, endpoint
    );
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Authorize stage: requires [`authenticate`] to have run first
#[derive(Debug, Clone)]
pub struct RequireRole {
    allowed: Vec<RoleCode>,
}

impl RequireRole {
    pub fn new(allowed: impl Into<Vec<RoleCode>>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    /// Create a middleware that requires the admin role
    pub fn admin() -> Self {
        Self::new([RoleCode::Admin])
    }

    pub fn check(&self, user: &AuthenticatedUser) -> Result<(), AuthError> {
        if self.allowed.contains(&user.role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions {
                allowed: self.allowed.clone(),
                actual: user.role,
            })
        }
    }

    /// Middleware function that validates role-based access
    pub async fn middleware(self, request: Request, next: Next) -> Result<Response, AuthError> {
        let user = request
            .extensions()
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AuthError::MissingToken)?;

        self.check(&user)?;

        debug!(
            "Authorization successful: user_id={}, role={}, endpoint={}",
            user.user_id,
            user.role,
            request.uri().path()
        );
        Ok(next.run(request).await)
    }
}
