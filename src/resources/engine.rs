use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use snafu::ensure;
use tracing::{debug, info};

use crate::resources::error::{EmptyNameSnafu, EmptyUrlSnafu, ParentNotFolderSnafu, ParentNotFoundSnafu};
use crate::resources::{BlobRegistry, HandleRegistry, Node, NodeContent, NodeId, TreeError, TreeStore};
use crate::upload::FilePayload;

/// Outcome of a delete: everything that left the store in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub removed: HashSet<NodeId>,
    pub released: usize,
    /// Parent of the deleted node, which survives the deletion.
    pub parent: Option<NodeId>,
}

/// Owns the tree store and the handle registry. The only place where nodes
/// are created, renamed or destroyed, and where blob handles are allocated or
/// released.
#[derive(Debug)]
pub struct ResourceTree<H: HandleRegistry = BlobRegistry> {
    store: TreeStore,
    handles: H,
    next_id: u64,
    last_created: SystemTime,
}

impl<H: HandleRegistry + Default> Default for ResourceTree<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<H: HandleRegistry> ResourceTree<H> {
    pub fn new(handles: H) -> Self {
        Self {
            store: TreeStore::default(),
            handles,
            next_id: 0,
            last_created: SystemTime::UNIX_EPOCH,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn handles(&self) -> &H {
        &self.handles
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.store.get(id)
    }

    pub fn children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.store.children(parent)
    }

    /// Uploaded bytes behind a file node. Folders and links have none.
    pub fn contents(&self, id: NodeId) -> Result<Option<&[u8]>, TreeError> {
        let node = self.store.get(id)?;
        Ok(node.handle().and_then(|handle| self.handles.resolve(handle)))
    }

    pub fn create_file(
        &mut self,
        payload: FilePayload,
        parent: Option<NodeId>,
    ) -> Result<&Node, TreeError> {
        let name = payload.name.trim().to_string();
        ensure!(!name.is_empty(), EmptyNameSnafu);
        self.validate_parent(parent)?;

        let size = payload.size();
        let handle = self.handles.allocate(payload.bytes);
        let content = NodeContent::File {
            handle,
            size,
            media_type: payload.media_type,
        };
        Ok(self.insert(name, content, parent))
    }

    pub fn create_link(
        &mut self,
        url: &str,
        name: &str,
        parent: Option<NodeId>,
    ) -> Result<&Node, TreeError> {
        let name = name.trim();
        let url = url.trim();
        ensure!(!name.is_empty(), EmptyNameSnafu);
        ensure!(!url.is_empty(), EmptyUrlSnafu);
        self.validate_parent(parent)?;

        let content = NodeContent::Link {
            url: url.to_string(),
        };
        Ok(self.insert(name.to_string(), content, parent))
    }

    pub fn create_folder(&mut self, name: &str, parent: Option<NodeId>) -> Result<&Node, TreeError> {
        let name = name.trim();
        ensure!(!name.is_empty(), EmptyNameSnafu);
        self.validate_parent(parent)?;

        Ok(self.insert(name.to_string(), NodeContent::Folder, parent))
    }

    /// Sibling names may repeat; only blank names are refused.
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<&Node, TreeError> {
        let new_name = new_name.trim();
        ensure!(!new_name.is_empty(), EmptyNameSnafu);

        let node = self.store.rename(id, new_name.to_string())?;
        info!("Renamed node {} to '{}'", id, node.name());
        Ok(node)
    }

    /// Deletes `id` and, for folders, its whole subtree. File handles are
    /// released in the same step as removal from the store.
    pub fn delete(&mut self, id: NodeId) -> Result<Deletion, TreeError> {
        let target = self.store.get(id)?;
        let parent = target.parent_id();

        let mut doomed = HashSet::from([id]);
        if target.is_folder() {
            doomed.extend(self.store.descendants(id));
        }
        debug!("Deleting {} node(s) rooted at {}", doomed.len(), id);

        let mut released = 0;
        for node in self.store.remove(&doomed) {
            if let Some(handle) = node.into_handle() {
                self.handles.release(handle);
                released += 1;
            }
        }

        info!(
            "Deleted node {} ({} removed, {} handle(s) released)",
            id,
            doomed.len(),
            released
        );
        Ok(Deletion {
            removed: doomed,
            released,
            parent,
        })
    }

    fn validate_parent(&self, parent: Option<NodeId>) -> Result<(), TreeError> {
        let Some(id) = parent else {
            return Ok(());
        };
        ensure!(self.store.contains(id), ParentNotFoundSnafu { id });
        ensure!(self.store.get(id)?.is_folder(), ParentNotFolderSnafu { id });
        Ok(())
    }

    fn insert(&mut self, name: String, content: NodeContent, parent: Option<NodeId>) -> &Node {
        self.next_id += 1;
        let id = NodeId::from(self.next_id);
        let created_at = self.next_timestamp();
        let kind = content.kind();

        info!("Created {} '{}' as node {} under {:?}", kind, name, id, parent);
        self.store
            .append(Node::new(id, name, content, created_at, parent))
    }

    /// Creation times strictly increase, even when the wall clock does not.
    fn next_timestamp(&mut self) -> SystemTime {
        let now = SystemTime::now();
        self.last_created = if now > self.last_created {
            now
        } else {
            self.last_created + Duration::from_nanos(1)
        };
        self.last_created
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::resources::{NodeKind, RecordingRegistry};

    fn payload(name: &str) -> FilePayload {
        FilePayload::new(name, "text/plain", name.as_bytes().to_vec())
    }

    fn folder(tree: &mut ResourceTree<impl HandleRegistry>, name: &str, parent: Option<NodeId>) -> NodeId {
        tree.create_folder(name, parent).unwrap().id()
    }

    fn file(tree: &mut ResourceTree<impl HandleRegistry>, name: &str, parent: Option<NodeId>) -> NodeId {
        tree.create_file(payload(name), parent).unwrap().id()
    }

    fn link(tree: &mut ResourceTree<impl HandleRegistry>, name: &str, parent: Option<NodeId>) -> NodeId {
        tree.create_link("https://example.org", name, parent).unwrap().id()
    }

    #[test]
    fn test_create_file_binds_handle() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let node = tree.create_file(payload("notes.txt"), None).unwrap();

        assert_eq!(node.kind(), NodeKind::File);
        assert_eq!(node.size(), 9);
        assert_eq!(node.media_type(), "text/plain");
        assert!(node.resource().unwrap().starts_with("blob:"));
        assert_eq!(tree.handles().live_count(), 1);
    }

    #[test]
    fn test_contents_resolve_only_for_files() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let notes = file(&mut tree, "notes.txt", None);
        let site = link(&mut tree, "site", None);

        assert_eq!(tree.contents(notes).unwrap(), Some(&b"notes.txt"[..]));
        assert_eq!(tree.contents(site).unwrap(), None);
        assert_eq!(
            tree.contents(NodeId::from(99)).unwrap_err(),
            TreeError::NotFound { id: NodeId::from(99) }
        );
    }

    #[test]
    fn test_create_under_missing_parent_fails_without_allocating() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let missing = NodeId::from(404);

        let err = tree.create_file(payload("a.txt"), Some(missing)).unwrap_err();

        assert_eq!(err, TreeError::ParentNotFound { id: missing });
        assert_eq!(tree.handles().live_count(), 0);
        assert!(tree.store().is_empty());
    }

    #[test]
    fn test_create_under_leaf_is_parent_not_folder() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let leaf = file(&mut tree, "a.txt", None);
        let url = link(&mut tree, "site", None);

        assert_eq!(
            tree.create_folder("sub", Some(leaf)).unwrap_err(),
            TreeError::ParentNotFolder { id: leaf }
        );
        assert_eq!(
            tree.create_link("https://x.org", "x", Some(url)).unwrap_err(),
            TreeError::ParentNotFolder { id: url }
        );
        assert_eq!(
            tree.create_file(payload("b.txt"), Some(url)).unwrap_err(),
            TreeError::ParentNotFolder { id: url }
        );
    }

    #[rstest]
    #[case("https://example.org", "", TreeError::EmptyName)]
    #[case("   ", "Docs", TreeError::EmptyUrl)]
    #[case("", "  ", TreeError::EmptyName)]
    fn test_create_link_validation(#[case] url: &str, #[case] name: &str, #[case] expected: TreeError) {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        assert_eq!(tree.create_link(url, name, None).unwrap_err(), expected);
        assert!(tree.store().is_empty());
    }

    #[test]
    fn test_create_folder_rejects_blank_name() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        assert_eq!(tree.create_folder(" \t", None).unwrap_err(), TreeError::EmptyName);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_rename_rejects_blank(#[case] blank: &str) {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let id = folder(&mut tree, "Original", None);

        assert_eq!(tree.rename(id, blank).unwrap_err(), TreeError::EmptyName);
        assert_eq!(tree.get(id).unwrap().name(), "Original");
    }

    #[test]
    fn test_rename_keeps_kind_and_parent() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let parent = folder(&mut tree, "Parent", None);
        let id = link(&mut tree, "Old", Some(parent));

        let node = tree.rename(id, "  New  ").unwrap();

        assert_eq!(node.name(), "New");
        assert_eq!(node.kind(), NodeKind::Link);
        assert_eq!(node.parent_id(), Some(parent));
    }

    #[test]
    fn test_rename_allows_duplicate_sibling_names() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        folder(&mut tree, "Same", None);
        let other = folder(&mut tree, "Other", None);

        assert!(tree.rename(other, "Same").is_ok());
    }

    #[test]
    fn test_rename_missing_is_not_found() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let id = NodeId::from(3);
        assert_eq!(tree.rename(id, "x").unwrap_err(), TreeError::NotFound { id });
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let id = NodeId::from(12);
        assert_eq!(tree.delete(id).unwrap_err(), TreeError::NotFound { id });
    }

    #[test]
    fn test_cascading_delete_is_exact() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let top = folder(&mut tree, "top", None);
        let mid = folder(&mut tree, "mid", Some(top));
        let deep = folder(&mut tree, "deep", Some(mid));
        let deepest = file(&mut tree, "deepest.txt", Some(deep));
        let mid_link = link(&mut tree, "mid-link", Some(mid));
        let top_file = file(&mut tree, "top.txt", Some(top));

        let sibling = folder(&mut tree, "sibling", None);
        let sibling_file = file(&mut tree, "keep.txt", Some(sibling));
        let root_file = file(&mut tree, "root.txt", None);

        let deletion = tree.delete(top).unwrap();

        assert_eq!(
            deletion.removed,
            HashSet::from([top, mid, deep, deepest, mid_link, top_file])
        );
        assert_eq!(deletion.parent, None);
        assert_eq!(tree.store().len(), 3);
        for survivor in [sibling, sibling_file, root_file] {
            assert!(tree.store().contains(survivor));
        }
        assert_eq!(tree.handles().live_count(), 2);
    }

    #[test]
    fn test_release_is_exact_per_file() {
        let mut tree = ResourceTree::new(RecordingRegistry::default());
        let top = folder(&mut tree, "top", None);
        let nested = folder(&mut tree, "nested", Some(top));
        let a = file(&mut tree, "a.bin", Some(top));
        let b = file(&mut tree, "b.bin", Some(nested));
        link(&mut tree, "site", Some(nested));
        folder(&mut tree, "empty", Some(nested));

        let expected: HashSet<String> = [a, b]
            .iter()
            .map(|id| tree.get(*id).unwrap().resource().unwrap().to_string())
            .collect();

        let deletion = tree.delete(top).unwrap();

        assert_eq!(deletion.released, 2);
        assert_eq!(tree.handles().released.len(), 2);
        let released: HashSet<String> = tree.handles().released.iter().cloned().collect();
        assert_eq!(released, expected);
    }

    #[test]
    fn test_deleting_link_or_folder_releases_nothing() {
        let mut tree = ResourceTree::new(RecordingRegistry::default());
        let site = link(&mut tree, "site", None);
        let empty = folder(&mut tree, "empty", None);

        assert_eq!(tree.delete(site).unwrap().released, 0);
        assert_eq!(tree.delete(empty).unwrap().released, 0);
        assert!(tree.handles().released.is_empty());
    }

    #[test]
    fn test_delete_leaf_reports_parent() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let parent = folder(&mut tree, "p", None);
        let leaf = file(&mut tree, "f.txt", Some(parent));

        let deletion = tree.delete(leaf).unwrap();

        assert_eq!(deletion.removed, HashSet::from([leaf]));
        assert_eq!(deletion.parent, Some(parent));
        assert!(tree.children(Some(parent)).is_empty());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let first = folder(&mut tree, "a", None);
        tree.delete(first).unwrap();
        let second = folder(&mut tree, "b", None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_creation_times_strictly_increase() {
        let mut tree = ResourceTree::<BlobRegistry>::default();
        let ids: Vec<_> = (0..20).map(|i| file(&mut tree, &format!("{i}.txt"), None)).collect();

        for pair in ids.windows(2) {
            let older = tree.get(pair[0]).unwrap().created_at();
            let newer = tree.get(pair[1]).unwrap().created_at();
            assert!(newer > older);
        }
    }

    #[test]
    fn test_forest_invariant_holds_across_mixed_operations() {
        let mut tree = ResourceTree::new(RecordingRegistry::default());
        let mut seed: u64 = 0x2545_f491;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for step in 0..400 {
            let ids: Vec<NodeId> = tree.store().iter().map(Node::id).collect();
            let parent = match next() % 4 {
                0 => None,
                _ if ids.is_empty() => None,
                _ => Some(ids[(next() as usize) % ids.len()]),
            };
            let outcome = match next() % 5 {
                0 | 1 => tree.create_folder(&format!("f{step}"), parent).map(|_| ()),
                2 => tree.create_file(payload(&format!("{step}.txt")), parent).map(|_| ()),
                3 => tree.create_link("https://example.org", &format!("l{step}"), parent).map(|_| ()),
                _ => match parent {
                    Some(id) => tree.delete(id).map(|_| ()),
                    None => Ok(()),
                },
            };
            if let Err(err) = outcome {
                assert_eq!(err, TreeError::ParentNotFolder { id: parent.unwrap() });
            }

            for node in tree.store().iter() {
                if let Some(parent_id) = node.parent_id() {
                    let parent = tree.get(parent_id).expect("dangling parent link");
                    assert!(parent.is_folder());
                }
                let depth = tree.store().path(Some(node.id())).expect("chain must resolve").len();
                assert!(depth <= tree.store().len());
            }
        }

        let released: HashSet<&String> = tree.handles().released.iter().collect();
        assert_eq!(released.len(), tree.handles().released.len());
        for node in tree.store().iter() {
            if let Some(resource) = node.resource() {
                assert!(!tree.handles().released.iter().any(|r| r == resource));
            }
        }
    }
}
