// Reference data and demo accounts loaded into an empty store

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use crate::auth::error::AuthError;
use crate::auth::models::NewUser;
use crate::auth::password::PasswordService;
use crate::db::Repositories;
use crate::error::StoreError;
use crate::menus::models::{MenuIcon, NewMenu};
use crate::roles::models::{NewRole, RoleCode};

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "Test123!";

/// Argon2id hash of [`DEMO_PASSWORD`], stored as-is by the already-hashed guard
pub const DEMO_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$XB8OipOyTX6hxvA7fS6YVA$Y+qmHHxaDEdlPNV6haeV+pYGJ6dmM7p3P/CbE9l1eSo";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed store error: {0}")]
    Store(#[from] StoreError),

    #[error("seed password error: {0}")]
    Password(#[from] AuthError),

    #[error("seed data references unknown menu '{0}'")]
    UnknownMenu(&'static str),
}

/// What a seeding run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub roles: usize,
    pub menus: usize,
    pub grants: usize,
    pub users: usize,
}

struct RoleSeed {
    code: RoleCode,
    name: &'static str,
    description: &'static str,
}

struct MenuSeed {
    key: &'static str,
    href: &'static str,
    icon: MenuIcon,
    parent: Option<&'static str>,
    order: i32,
}

struct UserSeed {
    uin: &'static str,
    uin_foreigner: Option<&'static str>,
    name_cyrillic: &'static str,
    name_latin: &'static str,
    email: &'static str,
    phone_number: &'static str,
    address: &'static str,
    username: &'static str,
    role: RoleCode,
}

const ROLES: &[RoleSeed] = &[
    RoleSeed {
        code: RoleCode::User,
        name: "Regular User",
        description: "Standard user with basic access",
    },
    RoleSeed {
        code: RoleCode::Admin,
        name: "Administrator",
        description: "System administrator with full access",
    },
    RoleSeed {
        code: RoleCode::Company,
        name: "Company User",
        description: "User with company-specific features",
    },
];

// Parents must precede their children
const MENUS: &[MenuSeed] = &[
    MenuSeed { key: "home", href: "/dashboard", icon: MenuIcon::Pie, parent: None, order: 1 },
    MenuSeed { key: "reports", href: "/dashboard/reports", icon: MenuIcon::Stack, parent: None, order: 2 },
    MenuSeed { key: "payments", href: "/dashboard/payments", icon: MenuIcon::Payment, parent: None, order: 3 },
    MenuSeed { key: "statements", href: "/dashboard/statements", icon: MenuIcon::Withdraw, parent: None, order: 4 },
    MenuSeed { key: "accounts", href: "/dashboard/accounts", icon: MenuIcon::List, parent: None, order: 5 },
    MenuSeed { key: "deposits", href: "/dashboard/deposits", icon: MenuIcon::Deposit, parent: None, order: 6 },
    MenuSeed { key: "cards", href: "/dashboard/cards", icon: MenuIcon::Card, parent: None, order: 7 },
    MenuSeed { key: "signTransfers", href: "/dashboard/sign-transfers", icon: MenuIcon::Pen, parent: None, order: 8 },
    MenuSeed { key: "documents", href: "/dashboard/documents", icon: MenuIcon::DocumentsSign, parent: None, order: 9 },
    MenuSeed { key: "services", href: "/dashboard/services", icon: MenuIcon::Letter, parent: None, order: 10 },
    MenuSeed { key: "utilities", href: "/dashboard/utilities", icon: MenuIcon::Book, parent: None, order: 11 },
    MenuSeed { key: "declarations", href: "/dashboard/declarations", icon: MenuIcon::Documents, parent: None, order: 12 },
    MenuSeed {
        key: "domesticPayment",
        href: "/dashboard/payments/domestic",
        icon: MenuIcon::Payment,
        parent: Some("payments"),
        order: 1,
    },
    MenuSeed {
        key: "internationalPayment",
        href: "/dashboard/payments/international",
        icon: MenuIcon::Globe,
        parent: Some("payments"),
        order: 2,
    },
];

// Admin needs no grants to see menus, but it gets every one for completeness
const USER_MENUS: &[&str] = &[
    "home",
    "statements",
    "accounts",
    "cards",
    "deposits",
    "payments",
    "domesticPayment",
];

const COMPANY_MENUS: &[&str] = &[
    "home",
    "payments",
    "statements",
    "accounts",
    "signTransfers",
    "documents",
    "services",
    "domesticPayment",
    "internationalPayment",
];

const USERS: &[UserSeed] = &[
    UserSeed {
        uin: "7501011234",
        uin_foreigner: None,
        name_cyrillic: "Админ Тестов",
        name_latin: "Admin Testov",
        email: "testadmin@example.com",
        phone_number: "+359 88 765 4321",
        address: "бул. Витоша 89, София, 1000",
        username: "testadmin",
        role: RoleCode::Admin,
    },
    UserSeed {
        uin: "8412129874",
        uin_foreigner: Some("A23456789"),
        name_cyrillic: "Потребител Тестов",
        name_latin: "User Testov",
        email: "testuser@example.com",
        phone_number: "+359 88 123 4567",
        address: "ул. Граф Игнатиев 18, София, 1000",
        username: "testuser",
        role: RoleCode::User,
    },
    UserSeed {
        uin: "9009021234",
        uin_foreigner: None,
        name_cyrillic: "Фирма Тестова",
        name_latin: "Company Testov",
        email: "testcompany@example.com",
        phone_number: "+359 89 876 5432",
        address: "ул. Раковски 56, София, 1000",
        username: "testcompany",
        role: RoleCode::Company,
    },
];

fn granted_menus(role: RoleCode) -> Vec<&'static str> {
    match role {
        RoleCode::Admin => MENUS.iter().map(|menu| menu.key).collect(),
        RoleCode::User => USER_MENUS.to_vec(),
        RoleCode::Company => COMPANY_MENUS.to_vec(),
    }
}

/// Load roles, menus, grants and demo accounts.
/// Does nothing when the store already holds roles, so restarts are safe.
pub async fn seed(
    repos: &Repositories,
    passwords: &PasswordService,
) -> Result<SeedSummary, SeedError> {
    if !repos.roles.list().await?.is_empty() {
        info!("Store already seeded, skipping");
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();

    let mut role_ids = HashMap::new();
    for seed in ROLES {
        let role = repos
            .roles
            .create(NewRole {
                code: seed.code,
                name: seed.name.to_string(),
                description: Some(seed.description.to_string()),
            })
            .await?;
        role_ids.insert(seed.code, role.id);
        summary.roles += 1;
    }

    let mut menu_ids: HashMap<&'static str, i32> = HashMap::new();
    for seed in MENUS {
        let parent_id = match seed.parent {
            Some(parent) => Some(*menu_ids.get(parent).ok_or(SeedError::UnknownMenu(parent))?),
            None => None,
        };
        let menu = repos
            .menus
            .create(NewMenu {
                key: seed.key.to_string(),
                href: seed.href.to_string(),
                icon: seed.icon,
                parent_id,
                order: seed.order,
                is_active: true,
            })
            .await?;
        menu_ids.insert(seed.key, menu.id);
        summary.menus += 1;
    }

    for (code, role_id) in ROLES.iter().map(|seed| (seed.code, role_ids[&seed.code])) {
        for key in granted_menus(code) {
            let menu_id = *menu_ids.get(key).ok_or(SeedError::UnknownMenu(key))?;
            repos.menus.grant(role_id, menu_id).await?;
            summary.grants += 1;
        }
    }

    let password_hash = passwords.hash_for_storage(DEMO_PASSWORD_HASH)?;
    for seed in USERS {
        repos
            .users
            .create(NewUser {
                uin: seed.uin.to_string(),
                uin_foreigner: seed.uin_foreigner.map(str::to_string),
                name_cyrillic: seed.name_cyrillic.to_string(),
                name_latin: seed.name_latin.to_string(),
                email: seed.email.to_string(),
                phone_number: seed.phone_number.to_string(),
                address: seed.address.to_string(),
                username: seed.username.to_string(),
                password_hash: password_hash.clone(),
                role_id: role_ids[&seed.role],
            })
            .await?;
        summary.users += 1;
    }

    info!(
        "Seeded {} roles, {} menus, {} grants, {} users",
        summary.roles, summary.menus, summary.grants, summary.users
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordConfig;
    use crate::memory::InMemoryStore;
    use std::sync::Arc;

    fn cheap_passwords() -> PasswordService {
        PasswordService::new(PasswordConfig {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_loads_reference_data() {
        let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
        let summary = seed(&repos, &cheap_passwords()).await.unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                roles: 3,
                menus: 14,
                grants: 14 + 7 + 9,
                users: 3,
            }
        );

        let user = repos.users.find_by_username("testuser").await.unwrap().unwrap();
        assert_eq!(user.uin_foreigner.as_deref(), Some("A23456789"));
        assert!(cheap_passwords().verify_password(DEMO_PASSWORD, &user.password_hash));
    }

    #[tokio::test]
    async fn test_seeded_hash_is_stored_verbatim() {
        let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
        seed(&repos, &cheap_passwords()).await.unwrap();

        for username in ["testadmin", "testuser", "testcompany"] {
            let user = repos.users.find_by_username(username).await.unwrap().unwrap();
            assert_eq!(user.password_hash, DEMO_PASSWORD_HASH);
        }
    }

    #[tokio::test]
    async fn test_seed_is_skipped_when_roles_exist() {
        let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
        let passwords = cheap_passwords();
        seed(&repos, &passwords).await.unwrap();

        let second = seed(&repos, &passwords).await.unwrap();
        assert_eq!(second, SeedSummary::default());
        assert_eq!(repos.roles.list().await.unwrap().len(), 3);
    }

    #[test]
    fn test_menu_parents_precede_children() {
        for (index, menu) in MENUS.iter().enumerate() {
            if let Some(parent) = menu.parent {
                assert!(MENUS[..index].iter().any(|earlier| earlier.key == parent));
            }
        }
    }

    #[test]
    fn test_grants_reference_known_menus() {
        for code in RoleCode::ALL {
            for key in granted_menus(code) {
                assert!(MENUS.iter().any(|menu| menu.key == key), "unknown menu {key}");
            }
        }
    }
}
