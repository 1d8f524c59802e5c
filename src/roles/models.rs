// Role data models

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Closed set of permission classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleCode {
    User,
    Admin,
    Company,
}

impl RoleCode {
    pub const ALL: [RoleCode; 3] = [RoleCode::User, RoleCode::Admin, RoleCode::Company];

    /// Role assigned to every self-registered user
    pub const DEFAULT: RoleCode = RoleCode::User;

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCode::User => "user",
            RoleCode::Admin => "admin",
            RoleCode::Company => "company",
        }
    }

    /// Admins see every active menu without a permission lookup
    pub fn bypasses_menu_grants(&self) -> bool {
        matches!(self, RoleCode::Admin)
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0} is not a valid role code")]
pub struct InvalidRoleCode(pub String);

impl FromStr for RoleCode {
    type Err = InvalidRoleCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(RoleCode::User),
            "admin" => Ok(RoleCode::Admin),
            "company" => Ok(RoleCode::Company),
            other => Err(InvalidRoleCode(other.to_string())),
        }
    }
}

/// Role reference data
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = 1)]
    pub id: i32,
    pub code: RoleCode,
    #[schema(example = "Regular User")]
    pub name: String,
    #[schema(example = "Standard user with basic access")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw role row; the code column is checked against the closed set on load
#[derive(Debug, FromRow)]
pub struct RoleRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = StoreError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let code = row
            .code
            .parse()
            .map_err(|e: InvalidRoleCode| StoreError::InvalidRecord(e.to_string()))?;
        Ok(Self {
            id: row.id,
            code,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Data needed to create a role
#[derive(Debug, Clone)]
pub struct NewRole {
    pub code: RoleCode,
    pub name: String,
    pub description: Option<String>,
}
