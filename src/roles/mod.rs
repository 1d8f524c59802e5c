// Roles module
// Closed-set role codes, role reference data and the admin role listing

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::{list_roles_handler, RoleListResponse};
pub use models::{NewRole, Role, RoleCode};
pub use repository::{PgRoleRepository, RoleRepository};
