use snafu::Snafu;

use crate::resources::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("No node with id {}", id))]
    NotFound { id: NodeId },
    #[snafu(display("Parent folder {} does not exist", id))]
    ParentNotFound { id: NodeId },
    #[snafu(display("Parent {} is not a folder", id))]
    ParentNotFolder { id: NodeId },
    #[snafu(display("Name must not be blank"))]
    EmptyName,
    #[snafu(display("URL must not be blank"))]
    EmptyUrl,
    #[snafu(display("Ancestry of node {} could not be resolved", id))]
    BrokenChain { id: NodeId },
}

impl TreeError {
    /// Validation failures that belong to the form boundary rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, TreeError::EmptyName | TreeError::EmptyUrl)
    }
}
