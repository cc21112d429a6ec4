use snafu::{OptionExt, ensure};
use tracing::{debug, warn};

use crate::resources::error::BrokenChainSnafu;
use crate::resources::{Deletion, NodeId, TreeError, TreeStore};

pub const DEFAULT_ROOT_LABEL: &str = "Home";
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One breadcrumb entry. The root crumb has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub id: Option<NodeId>,
    pub name: String,
}

/// The folder currently being viewed (`None` is the root).
#[derive(Debug, Clone)]
pub struct NavigationCursor {
    current: Option<NodeId>,
    root_label: String,
    max_depth: usize,
}

impl Default for NavigationCursor {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_LABEL, DEFAULT_MAX_DEPTH)
    }
}

impl NavigationCursor {
    pub fn new(root_label: impl Into<String>, max_depth: usize) -> Self {
        Self {
            current: None,
            root_label: root_label.into(),
            max_depth,
        }
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Moves to `target` without checking that it names a folder.
    pub fn navigate(&mut self, target: Option<NodeId>) {
        debug!("Cursor moved from {:?} to {:?}", self.current, target);
        self.current = target;
    }

    pub fn reset(&mut self) {
        self.navigate(None);
    }

    /// Moves to the parent of the current folder. At the root this is a no-op.
    pub fn ascend(&mut self, store: &TreeStore) -> Result<(), TreeError> {
        if let Some(id) = self.current {
            let parent = store.get(id).ok().context(BrokenChainSnafu { id })?.parent_id();
            self.navigate(parent);
        }
        Ok(())
    }

    /// Root-first trail ending at the current folder.
    ///
    /// Trails deeper than the configured maximum are treated as a broken chain.
    pub fn breadcrumb(&self, store: &TreeStore) -> Result<Vec<Crumb>, TreeError> {
        let path = store.path(self.current)?;
        if let Some(id) = self.current {
            ensure!(path.len() <= self.max_depth, BrokenChainSnafu { id });
        }

        let root = Crumb {
            id: None,
            name: self.root_label.clone(),
        };
        let trail = path.into_iter().map(|node| Crumb {
            id: Some(node.id()),
            name: node.name().to_string(),
        });
        Ok(std::iter::once(root).chain(trail).collect())
    }

    /// Moves the cursor out of a deleted subtree, onto the deleted node's parent.
    ///
    /// Returns whether the cursor moved.
    pub fn recover(&mut self, deletion: &Deletion) -> bool {
        match self.current {
            Some(id) if deletion.removed.contains(&id) => {
                warn!(
                    "Current folder {} was deleted, moving to {:?}",
                    id, deletion.parent
                );
                self.navigate(deletion.parent);
                true
            }
            _ => false,
        }
    }
}
