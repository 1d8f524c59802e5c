// Role repository

use crate::error::StoreError;
use crate::roles::models::{NewRole, Role, RoleCode, RoleRow};
use async_trait::async_trait;
use sqlx::PgPool;

/// Store operations on role reference data
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_code(&self, code: RoleCode) -> Result<Option<Role>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError>;

    async fn list(&self) -> Result<Vec<Role>, StoreError>;

    async fn create(&self, role: NewRole) -> Result<Role, StoreError>;
}

/// PostgreSQL-backed role repository
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_code(&self, code: RoleCode) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, code, name, description, created_at FROM roles WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Role::try_from).transpose()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, code, name, description, created_at FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Role::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, code, name, description, created_at FROM roles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn create(&self, role: NewRole) -> Result<Role, StoreError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, code, name, description, created_at
            "#,
        )
        .bind(role.code.as_str())
        .bind(&role.name)
        .bind(&role.description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;

        Role::try_from(row)
    }
}
