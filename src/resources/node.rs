use std::time::SystemTime;

use derive_more::{Display, From, FromStr, Into};

use crate::resources::BlobHandle;

/// Identifier of a node. Allocated from a monotonic counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, FromStr)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("folder")]
    Folder,
    #[display("file")]
    File,
    #[display("link")]
    Link,
}

/// What a node refers to. The variant fixes the node's kind for its whole life.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeContent {
    Folder,
    File {
        handle: BlobHandle,
        size: u64,
        media_type: String,
    },
    Link {
        url: String,
    },
}

impl NodeContent {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeContent::Folder => NodeKind::Folder,
            NodeContent::File { .. } => NodeKind::File,
            NodeContent::Link { .. } => NodeKind::Link,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    name: String,
    content: NodeContent,
    created_at: SystemTime,
    parent_id: Option<NodeId>,
}

impl Node {
    pub(super) fn new(
        id: NodeId,
        name: String,
        content: NodeContent,
        created_at: SystemTime,
        parent_id: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            name,
            content,
            created_at,
            parent_id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == NodeKind::Folder
    }

    /// Byte count of an uploaded file; zero for folders and links.
    pub fn size(&self) -> u64 {
        match &self.content {
            NodeContent::File { size, .. } => *size,
            NodeContent::Folder | NodeContent::Link { .. } => 0,
        }
    }

    pub fn media_type(&self) -> &str {
        match &self.content {
            NodeContent::File { media_type, .. } => media_type,
            NodeContent::Link { .. } => "link",
            NodeContent::Folder => "folder",
        }
    }

    /// The blob handle of a file or the external URL of a link.
    pub fn resource(&self) -> Option<&str> {
        match &self.content {
            NodeContent::File { handle, .. } => Some(handle.as_str()),
            NodeContent::Link { url } => Some(url),
            NodeContent::Folder => None,
        }
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub(super) fn handle(&self) -> Option<&BlobHandle> {
        match &self.content {
            NodeContent::File { handle, .. } => Some(handle),
            NodeContent::Folder | NodeContent::Link { .. } => None,
        }
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Consumes the node, handing back the blob handle it owned, if any.
    pub(super) fn into_handle(self) -> Option<BlobHandle> {
        match self.content {
            NodeContent::File { handle, .. } => Some(handle),
            NodeContent::Folder | NodeContent::Link { .. } => None,
        }
    }
}
