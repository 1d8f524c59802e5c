// Menus module
// Navigation menus, role grants and role-filtered tree resolution

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod tree;

pub use error::MenuError;
pub use handlers::menus_handler;
pub use models::{Menu, MenuIcon, MenuListResponse, MenuNode, NewMenu, RoleMenu};
pub use repository::{MenuRepository, PgMenuRepository};
pub use service::MenuService;
pub use tree::build_menu_tree;
