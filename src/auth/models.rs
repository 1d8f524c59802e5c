// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::roles::RoleCode;
use crate::validation::{
    validate_address, validate_name_cyrillic, validate_name_latin, validate_password,
    validate_phone_number, validate_uin, validate_username,
};

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub uin: String,
    pub uin_foreigner: Option<String>,
    pub name_cyrillic: String,
    pub name_latin: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub username: String,
    pub password_hash: String,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Data needed to persist a new user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uin: String,
    pub uin_foreigner: Option<String>,
    pub name_cyrillic: String,
    pub name_latin: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub username: String,
    pub password_hash: String,
    pub role_id: i32,
}

/// Sanitized user projection (never carries the password hash)
///
/// Login, registration and the current-user lookup all return this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "8412129874")]
    pub uin: String,
    pub uin_foreigner: Option<String>,
    #[schema(example = "Потребител Тестов")]
    pub name_cyrillic: String,
    #[schema(example = "User Testov")]
    pub name_latin: String,
    #[schema(example = "testuser@example.com")]
    pub email: String,
    #[schema(example = "+359 88 123 4567")]
    pub phone_number: String,
    pub address: String,
    #[schema(example = "testuser")]
    pub username: String,
    pub role: RoleCode,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: User, role: RoleCode) -> Self {
        Self {
            id: user.id,
            uin: user.uin,
            uin_foreigner: user.uin_foreigner,
            name_cyrillic: user.name_cyrillic,
            name_latin: user.name_latin,
            email: user.email,
            phone_number: user.phone_number,
            address: user.address,
            username: user.username,
            role,
            created_at: user.created_at,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom = "validate_uin")]
    #[schema(example = "8412129874")]
    pub uin: String,
    pub uin_foreigner: Option<String>,
    #[validate(custom = "validate_name_cyrillic")]
    #[schema(example = "Алиса Тестова")]
    pub name_cyrillic: String,
    #[validate(custom = "validate_name_latin")]
    #[schema(example = "Alice Testova")]
    pub name_latin: String,
    #[validate(email(message = "Email is invalid"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[validate(custom = "validate_phone_number")]
    #[schema(example = "+359 88 123 4567")]
    pub phone_number: String,
    #[validate(custom = "validate_address")]
    #[schema(example = "ул. Граф Игнатиев 18, София")]
    pub address: String,
    #[validate(custom = "validate_username")]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(custom = "validate_password")]
    #[schema(example = "Secret123")]
    pub password: String,
}

impl RegisterRequest {
    /// Trim text fields and lower-case the email; the password is left untouched
    pub fn normalized(self) -> Self {
        Self {
            uin: self.uin.trim().to_string(),
            uin_foreigner: self
                .uin_foreigner
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            name_cyrillic: self.name_cyrillic.trim().to_string(),
            name_latin: self.name_latin.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone_number: self.phone_number.trim().to_string(),
            address: self.address.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}

/// Login request DTO
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "testuser")]
    pub username: String,
    #[schema(example = "Test123!")]
    pub password: String,
}

/// Authentication response DTO, shared by login and registration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub token: String,
}

impl AuthResponse {
    pub fn new(user: UserResponse, token: String) -> Self {
        Self {
            success: true,
            user,
            token,
        }
    }
}

/// Current user response DTO
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: UserResponse,
}
