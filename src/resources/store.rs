use std::collections::{HashMap, HashSet};

use hashlink::LinkedHashMap;
use snafu::OptionExt;
use tracing::error;

use crate::resources::error::{BrokenChainSnafu, NotFoundSnafu};
use crate::resources::{Node, NodeId, TreeError};

/// Flat node collection with a parent-to-children index.
///
/// Nodes are kept in insertion order; that order carries no meaning for
/// presentation. Mutators are reserved for the mutation engine.
#[derive(Debug, Default)]
pub struct TreeStore {
    nodes: LinkedHashMap<NodeId, Node>,
    children: HashMap<Option<NodeId>, Vec<NodeId>>,
}

impl TreeStore {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).context(NotFoundSnafu { id })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Direct children of `folder` (`None` is the root), unordered.
    pub fn children(&self, folder: Option<NodeId>) -> Vec<&Node> {
        self.children
            .get(&folder)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    /// Nodes from the topmost ancestor down to `folder` itself.
    ///
    /// The walk is bounded by the store size, so a corrupted parent chain
    /// surfaces as `BrokenChain` instead of looping.
    pub fn path(&self, folder: Option<NodeId>) -> Result<Vec<&Node>, TreeError> {
        let mut path = Vec::new();
        let mut next = folder;

        while let Some(id) = next {
            if path.len() > self.nodes.len() {
                error!("Parent chain starting at {:?} exceeds store size", folder);
                return BrokenChainSnafu { id }.fail();
            }
            let node = self.nodes.get(&id).context(BrokenChainSnafu { id })?;
            path.push(node);
            next = node.parent_id();
        }

        path.reverse();
        Ok(path)
    }

    /// Every transitive descendant of `id`, folders and leaves alike.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending = vec![id];
        let mut visited = HashSet::from([id]);

        while let Some(current) = pending.pop() {
            for child in self.children.get(&Some(current)).into_iter().flatten() {
                if !visited.insert(*child) {
                    error!("Node {} reached twice while collecting descendants", child);
                    continue;
                }
                found.push(*child);
                pending.push(*child);
            }
        }

        found
    }

    pub(super) fn append(&mut self, node: Node) -> &Node {
        let id = node.id();
        self.children.entry(node.parent_id()).or_default().push(id);
        self.nodes.entry(id).or_insert(node)
    }

    pub(super) fn rename(&mut self, id: NodeId, name: String) -> Result<&Node, TreeError> {
        let node = self.nodes.get_mut(&id).context(NotFoundSnafu { id })?;
        node.set_name(name);
        Ok(node)
    }

    /// Removes every id in `ids` in one step and returns the removed nodes.
    pub(super) fn remove(&mut self, ids: &HashSet<NodeId>) -> Vec<Node> {
        let removed: Vec<Node> = ids.iter().filter_map(|id| self.nodes.remove(id)).collect();

        for node in &removed {
            self.children.remove(&Some(node.id()));
            if let Some(siblings) = self.children.get_mut(&node.parent_id()) {
                siblings.retain(|sibling| !ids.contains(sibling));
            }
        }

        removed
    }
}
