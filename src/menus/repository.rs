// Menu and role-menu grant repository

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::menus::models::{Menu, MenuRow, NewMenu, RoleMenu};

const MENU_COLUMNS: &str = "id, key, href, icon, parent_id, sort_order, is_active, created_at";

/// Store operations on menus and their role grants
///
/// Listings come back in insertion order (ascending id).
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Menu>, StoreError>;

    /// Active menus among `ids`; unknown ids are ignored
    async fn find_active_by_ids(&self, ids: &[i32]) -> Result<Vec<Menu>, StoreError>;

    /// Ids of every menu granted to a role, active or not
    async fn menu_ids_for_role(&self, role_id: i32) -> Result<Vec<i32>, StoreError>;

    async fn create(&self, menu: NewMenu) -> Result<Menu, StoreError>;

    async fn grant(&self, role_id: i32, menu_id: i32) -> Result<RoleMenu, StoreError>;
}

/// PostgreSQL-backed menu repository
#[derive(Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_menus(rows: Vec<MenuRow>) -> Result<Vec<Menu>, StoreError> {
    rows.into_iter().map(Menu::try_from).collect()
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn list_active(&self) -> Result<Vec<Menu>, StoreError> {
        let query = format!("SELECT {MENU_COLUMNS} FROM menus WHERE is_active ORDER BY id");
        let rows = sqlx::query_as::<_, MenuRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        into_menus(rows)
    }

    async fn find_active_by_ids(&self, ids: &[i32]) -> Result<Vec<Menu>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE is_active AND id = ANY($1) ORDER BY id"
        );
        let rows = sqlx::query_as::<_, MenuRow>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        into_menus(rows)
    }

    async fn menu_ids_for_role(&self, role_id: i32) -> Result<Vec<i32>, StoreError> {
        let ids: Vec<(i32,)> =
            sqlx::query_as("SELECT menu_id FROM role_menus WHERE role_id = $1 ORDER BY id")
                .bind(role_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn create(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let query = format!(
            "INSERT INTO menus (key, href, icon, parent_id, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {MENU_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MenuRow>(&query)
            .bind(&menu.key)
            .bind(&menu.href)
            .bind(menu.icon.as_str())
            .bind(menu.parent_id)
            .bind(menu.order)
            .bind(menu.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_insert)?;

        Menu::try_from(row)
    }

    async fn grant(&self, role_id: i32, menu_id: i32) -> Result<RoleMenu, StoreError> {
        sqlx::query_as::<_, RoleMenu>(
            "INSERT INTO role_menus (role_id, menu_id) VALUES ($1, $2) RETURNING id, role_id, menu_id",
        )
        .bind(role_id)
        .bind(menu_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_insert)
    }
}
