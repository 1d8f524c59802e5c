// Authentication service - business logic layer

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};
use crate::roles::{RoleCode, RoleRepository};
use crate::session::IdentityVerifier;

/// Authentication service coordinating registration, login and identity lookup
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            roles,
            passwords,
            tokens,
        }
    }

    /// Register a new user with the default role
    ///
    /// Checks run in order and stop at the first failure: input validation,
    /// email uniqueness, username uniqueness, then the default role lookup.
    /// The store's unique constraints still decide races between concurrent
    /// registrations.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let request = request.normalized();
        request.validate()?;

        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }
        if self.users.username_exists(&request.username).await? {
            return Err(AuthError::UsernameAlreadyExists);
        }

        let role = self
            .roles
            .find_by_code(RoleCode::DEFAULT)
            .await?
            .ok_or_else(|| {
                AuthError::ConfigError(format!("default role '{}' is not seeded", RoleCode::DEFAULT))
            })?;

        let password_hash = self.passwords.hash_password_blocking(request.password).await?;

        let user = self
            .users
            .create(NewUser {
                uin: request.uin,
                uin_foreigner: request.uin_foreigner,
                name_cyrillic: request.name_cyrillic,
                name_latin: request.name_latin,
                email: request.email,
                phone_number: request.phone_number,
                address: request.address,
                username: request.username,
                password_hash,
                role_id: role.id,
            })
            .await?;

        let token = self.tokens.issue(user.id, role.code)?;
        info!("Registered user_id={} with role={}", user.id, role.code);

        Ok(AuthResponse::new(UserResponse::from_user(user, role.code), token))
    }

    /// Log in by username; unknown user and wrong password fail identically
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = match self.users.find_by_username(request.username.trim()).await? {
            Some(user) => user,
            None => {
                debug!("Login for unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches = self
            .passwords
            .verify_password_blocking(request.password, user.password_hash.clone())
            .await;
        if !matches {
            debug!("Password mismatch for user_id={}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let role = self.role_of(&user).await?;
        let token = self.tokens.issue(user.id, role)?;
        debug!("User logged in: user_id={}", user.id);

        Ok(AuthResponse::new(UserResponse::from_user(user, role), token))
    }

    /// Get the sanitized profile for a token subject
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let role = self.role_of(&user).await?;
        Ok(UserResponse::from_user(user, role))
    }

    async fn role_of(&self, user: &User) -> Result<RoleCode, AuthError> {
        self.roles
            .find_by_id(user.role_id)
            .await?
            .map(|role| role.code)
            .ok_or_else(|| {
                AuthError::ConfigError(format!(
                    "role id {} referenced by user {} does not exist",
                    user.role_id, user.id
                ))
            })
    }
}

#[async_trait]
impl IdentityVerifier for AuthService {
    async fn verify_identity(&self, token: &str) -> Result<UserResponse, AuthError> {
        let claims = self.tokens.verify(token)?;
        self.get_current_user(claims.sub).await
    }
}
