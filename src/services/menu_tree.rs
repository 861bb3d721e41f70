//! Rebuilds the nested menu forest from flat parent-pointer rows.
//!
//! The build is two-phase: every row is indexed by id before any parent link
//! is made, so a child listed ahead of its parent is still attached. Rows whose
//! parent is absent from the input become roots; this is how a role granted a
//! child without its parent sees that child at the top level.

use std::collections::HashMap;

use serde::Serialize;

use crate::entities::menu;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub id: i32,
    pub parent_id: i32,
    pub name: String,
    pub title: String,
    pub path: String,
    pub component: String,
    pub icon: String,
    pub sort: i32,
    #[serde(rename = "type")]
    pub kind: i32,
    pub status: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl From<menu::Model> for MenuNode {
    fn from(model: menu::Model) -> Self {
        Self {
            id: model.id,
            parent_id: model.parent_id,
            name: model.name,
            title: model.title,
            path: model.path,
            component: model.component,
            icon: model.icon,
            sort: model.sort,
            kind: model.kind,
            status: model.status,
            children: Vec::new(),
        }
    }
}

/// Build the forest from rows already in display order (sort, then id).
///
/// Sibling order follows input order. Every input row appears exactly once in
/// the output; rows caught in a parent cycle are never reachable from a root
/// and are emitted as extra roots after the regular ones.
pub fn build_tree(menus: Vec<menu::Model>) -> Vec<MenuNode> {
    // Phase 1: index every row and collect child lists.
    let index: HashMap<i32, usize> = menus
        .iter()
        .enumerate()
        .map(|(pos, m)| (m.id, pos))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); menus.len()];
    let mut roots = Vec::new();
    for (pos, m) in menus.iter().enumerate() {
        match index.get(&m.parent_id) {
            Some(&parent) if m.parent_id != 0 && parent != pos => children[parent].push(pos),
            _ => roots.push(pos),
        }
    }

    // Phase 2: move rows into owned nodes, depth-first from each root.
    let mut slots: Vec<Option<menu::Model>> = menus.into_iter().map(Some).collect();
    let mut forest = Vec::with_capacity(roots.len());
    for pos in roots {
        if let Some(node) = take_subtree(pos, &children, &mut slots) {
            forest.push(node);
        }
    }

    for pos in 0..slots.len() {
        if slots[pos].is_some() {
            if let Some(node) = take_subtree(pos, &children, &mut slots) {
                forest.push(node);
            }
        }
    }

    forest
}

fn take_subtree(
    pos: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<menu::Model>],
) -> Option<MenuNode> {
    let mut node = MenuNode::from(slots[pos].take()?);
    for &child in &children[pos] {
        if let Some(child_node) = take_subtree(child, children, slots) {
            node.children.push(child_node);
        }
    }
    Some(node)
}
