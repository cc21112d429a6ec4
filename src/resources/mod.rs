//! In-memory resource tree: folders, uploaded files and external links.
//!
//! The [`TreeStore`] holds a flat collection of nodes linked to their parent
//! folder. [`ResourceTree`] is the only mutator and owns the blob handles of
//! uploaded files. [`NavigationCursor`] tracks the folder being viewed.

mod cursor;
mod engine;
mod error;
mod handles;
pub mod listing;
mod node;
mod store;

pub use cursor::{Crumb, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_LABEL, NavigationCursor};
pub use engine::{Deletion, ResourceTree};
pub use error::TreeError;
#[cfg(test)]
pub(crate) use handles::RecordingRegistry;
pub use handles::{BlobHandle, BlobRegistry, HandleRegistry};
pub use node::{Node, NodeContent, NodeId, NodeKind};
pub use store::TreeStore;
