// Menu tree assembly

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::menus::models::{Menu, MenuNode};

/// Assemble the accessible flat menu set into a tree
///
/// Menus are ordered by `order` ascending; the sort is stable, so ties keep
/// the order the store returned them in. A menu whose parent is not in the
/// set is dropped together with its subtree. Roots and every sibling list
/// come out in ascending `order`.
pub fn build_menu_tree(mut menus: Vec<Menu>) -> Vec<MenuNode> {
    menus.sort_by_key(|menu| menu.order);

    let present: HashSet<i32> = menus.iter().map(|menu| menu.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<i32, Vec<&Menu>> = HashMap::new();

    for menu in &menus {
        match menu.parent_id {
            None => roots.push(menu),
            Some(parent_id) if present.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(menu);
            }
            Some(parent_id) => {
                debug!(
                    "Dropping menu '{}': parent {} is not accessible",
                    menu.key, parent_id
                );
            }
        }
    }

    // Only chains that end in a root are reachable, so parent cycles are never visited
    roots
        .into_iter()
        .map(|menu| assemble(menu, &children))
        .collect()
}

fn assemble(menu: &Menu, children: &HashMap<i32, Vec<&Menu>>) -> MenuNode {
    let mut node = MenuNode::from_menu(menu);
    if let Some(kids) = children.get(&menu.id) {
        node.children = kids.iter().map(|child| assemble(child, children)).collect();
    }
    node
}
