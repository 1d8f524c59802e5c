// Menu resolution service

use std::sync::Arc;

use tracing::debug;

use crate::menus::{
    error::MenuError,
    models::MenuNode,
    repository::MenuRepository,
    tree::build_menu_tree,
};
use crate::roles::{RoleCode, RoleRepository};

/// Resolves the navigation tree a role may see; nothing is cached between requests
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { menus, roles }
    }

    /// Admin sees every active menu regardless of grants; other roles see
    /// their granted active menus, assembled into a tree.
    pub async fn resolve_accessible_menus(
        &self,
        role: RoleCode,
    ) -> Result<Vec<MenuNode>, MenuError> {
        let menus = if role.bypasses_menu_grants() {
            self.menus.list_active().await?
        } else {
            let record = self
                .roles
                .find_by_code(role)
                .await?
                .ok_or(MenuError::RoleNotFound(role))?;
            let ids = self.menus.menu_ids_for_role(record.id).await?;
            self.menus.find_active_by_ids(&ids).await?
        };

        debug!("Resolved {} accessible menus for role={}", menus.len(), role);
        Ok(build_menu_tree(menus))
    }
}
