use std::cmp::Ordering;

use crate::resources::{Node, NodeId, TreeStore};

/// Children of `folder` in presentation order.
pub fn list(store: &TreeStore, folder: Option<NodeId>) -> Vec<&Node> {
    sorted(store.children(folder))
}

pub fn sorted(mut nodes: Vec<&Node>) -> Vec<&Node> {
    nodes.sort_by(|a, b| presentation_order(a, b));
    nodes
}

/// Folders before leaves. Folders by name, case sensitive; leaves newest first.
pub fn presentation_order(a: &Node, b: &Node) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())),
        (false, false) => b
            .created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id())),
    }
}
