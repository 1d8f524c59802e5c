// In-memory credential store
// Implements the user, role and menu repositories over a single locked table set,
// enforcing the same unique and reference constraints as the PostgreSQL schema.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::auth::models::{NewUser, User};
use crate::auth::repository::UserRepository;
use crate::error::{StoreError, UniqueField};
use crate::menus::models::{Menu, NewMenu, RoleMenu};
use crate::menus::repository::MenuRepository;
use crate::roles::models::{NewRole, Role, RoleCode};
use crate::roles::repository::RoleRepository;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    roles: Vec<Role>,
    menus: Vec<Menu>,
    role_menus: Vec<RoleMenu>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store; rows keep insertion order
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .iter()
            .any(|existing| existing.email.to_lowercase() == user.email.to_lowercase())
        {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if tables.users.iter().any(|existing| existing.username == user.username) {
            return Err(StoreError::UniqueViolation(UniqueField::Username));
        }
        if !tables.roles.iter().any(|role| role.id == user.role_id) {
            return Err(StoreError::InvalidRecord(format!(
                "role {} does not exist",
                user.role_id
            )));
        }

        let record = User {
            id: tables.next_id(),
            uin: user.uin,
            uin_foreigner: user.uin_foreigner,
            name_cyrillic: user.name_cyrillic,
            name_latin: user.name_latin,
            email: user.email,
            phone_number: user.phone_number,
            address: user.address,
            username: user.username,
            password_hash: user.password_hash,
            role_id: user.role_id,
            created_at: Utc::now(),
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_code(&self, code: RoleCode) -> Result<Option<Role>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|role| role.code == code).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|role| role.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.tables.read().await.roles.clone())
    }

    async fn create(&self, role: NewRole) -> Result<Role, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.roles.iter().any(|existing| existing.code == role.code) {
            return Err(StoreError::UniqueViolation(UniqueField::RoleCode));
        }

        let record = Role {
            id: tables.next_id(),
            code: role.code,
            name: role.name,
            description: role.description,
            created_at: Utc::now(),
        };
        tables.roles.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl MenuRepository for InMemoryStore {
    async fn list_active(&self) -> Result<Vec<Menu>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.menus.iter().filter(|menu| menu.is_active).cloned().collect())
    }

    async fn find_active_by_ids(&self, ids: &[i32]) -> Result<Vec<Menu>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .menus
            .iter()
            .filter(|menu| menu.is_active && ids.contains(&menu.id))
            .cloned()
            .collect())
    }

    async fn menu_ids_for_role(&self, role_id: i32) -> Result<Vec<i32>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_menus
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .map(|grant| grant.menu_id)
            .collect())
    }

    async fn create(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.menus.iter().any(|existing| existing.key == menu.key) {
            return Err(StoreError::UniqueViolation(UniqueField::MenuKey));
        }
        if let Some(parent_id) = menu.parent_id {
            if !tables.menus.iter().any(|existing| existing.id == parent_id) {
                return Err(StoreError::InvalidRecord(format!(
                    "parent menu {} does not exist",
                    parent_id
                )));
            }
        }

        let record = Menu {
            id: tables.next_id(),
            key: menu.key,
            href: menu.href,
            icon: menu.icon,
            parent_id: menu.parent_id,
            order: menu.order,
            is_active: menu.is_active,
            created_at: Utc::now(),
        };
        tables.menus.push(record.clone());
        Ok(record)
    }

    async fn grant(&self, role_id: i32, menu_id: i32) -> Result<RoleMenu, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.roles.iter().any(|role| role.id == role_id) {
            return Err(StoreError::InvalidRecord(format!("role {} does not exist", role_id)));
        }
        if !tables.menus.iter().any(|menu| menu.id == menu_id) {
            return Err(StoreError::InvalidRecord(format!("menu {} does not exist", menu_id)));
        }
        if tables
            .role_menus
            .iter()
            .any(|grant| grant.role_id == role_id && grant.menu_id == menu_id)
        {
            return Err(StoreError::UniqueViolation(UniqueField::RoleMenu));
        }

        let record = RoleMenu {
            id: tables.next_id(),
            role_id,
            menu_id,
        };
        tables.role_menus.push(record);
        Ok(record)
    }
}
