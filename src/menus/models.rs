// Menu data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::StoreError;

/// Closed set of navigation icons the frontend can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MenuIcon {
    Book,
    Card,
    Deposit,
    Documents,
    DocumentsSign,
    Globe,
    Interface,
    Letter,
    List,
    Payment,
    Pen,
    Pie,
    Security,
    Stack,
    Withdraw,
}

impl MenuIcon {
    pub const ALL: [MenuIcon; 15] = [
        MenuIcon::Book,
        MenuIcon::Card,
        MenuIcon::Deposit,
        MenuIcon::Documents,
        MenuIcon::DocumentsSign,
        MenuIcon::Globe,
        MenuIcon::Interface,
        MenuIcon::Letter,
        MenuIcon::List,
        MenuIcon::Payment,
        MenuIcon::Pen,
        MenuIcon::Pie,
        MenuIcon::Security,
        MenuIcon::Stack,
        MenuIcon::Withdraw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuIcon::Book => "Book",
            MenuIcon::Card => "Card",
            MenuIcon::Deposit => "Deposit",
            MenuIcon::Documents => "Documents",
            MenuIcon::DocumentsSign => "DocumentsSign",
            MenuIcon::Globe => "Globe",
            MenuIcon::Interface => "Interface",
            MenuIcon::Letter => "Letter",
            MenuIcon::List => "List",
            MenuIcon::Payment => "Payment",
            MenuIcon::Pen => "Pen",
            MenuIcon::Pie => "Pie",
            MenuIcon::Security => "Security",
            MenuIcon::Stack => "Stack",
            MenuIcon::Withdraw => "Withdraw",
        }
    }
}

impl fmt::Display for MenuIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown menu icon '{0}'")]
pub struct UnknownMenuIcon(pub String);

impl FromStr for MenuIcon {
    type Err = UnknownMenuIcon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MenuIcon::ALL
            .into_iter()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| UnknownMenuIcon(s.to_string()))
    }
}

/// Navigation entry
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub id: i32,
    pub key: String,
    pub href: String,
    pub icon: MenuIcon,
    pub parent_id: Option<i32>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Menu database row; `order` is stored as `sort_order`
#[derive(Debug, Clone, FromRow)]
pub struct MenuRow {
    pub id: i32,
    pub key: String,
    pub href: String,
    pub icon: String,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MenuRow> for Menu {
    type Error = StoreError;

    fn try_from(row: MenuRow) -> Result<Self, Self::Error> {
        let icon = row
            .icon
            .parse::<MenuIcon>()
            .map_err(|e| StoreError::InvalidRecord(format!("menu {}: {}", row.id, e)))?;

        Ok(Menu {
            id: row.id,
            key: row.key,
            href: row.href,
            icon,
            parent_id: row.parent_id,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// Data needed to persist a new menu
#[derive(Debug, Clone)]
pub struct NewMenu {
    pub key: String,
    pub href: String,
    pub icon: MenuIcon,
    pub parent_id: Option<i32>,
    pub order: i32,
    pub is_active: bool,
}

/// Grant of one menu to one role
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RoleMenu {
    pub id: i32,
    pub role_id: i32,
    pub menu_id: i32,
}

/// Node of the resolved navigation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuNode {
    pub id: i32,
    #[schema(example = "payments")]
    pub key: String,
    #[schema(example = "/dashboard/payments")]
    pub href: String,
    pub icon: MenuIcon,
    pub order: i32,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Fresh node with no children
    pub fn from_menu(menu: &Menu) -> Self {
        Self {
            id: menu.id,
            key: menu.key.clone(),
            href: menu.href.clone(),
            icon: menu.icon,
            order: menu.order,
            children: Vec::new(),
        }
    }
}

/// Menu tree envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<MenuNode>,
}
