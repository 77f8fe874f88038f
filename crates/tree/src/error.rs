use crate::node::{NodeId, NodeKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("XML parsing error: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("Node allocation failed: arena holds {len} nodes")]
    Allocation { len: usize },

    #[error("Nodes of kind {0:?} cannot be copied")]
    Uncopyable(NodeKind),

    #[error("Node {0} does not belong to this document")]
    ForeignNode(NodeId),

    #[error("Node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("Nodes of kind {0:?} cannot have children")]
    InvalidParent(NodeKind),

    #[error("XML writer error: {0}")]
    Write(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TreeError {
    /// True when the error comes from arena exhaustion rather than from the
    /// shape of the tree.
    pub fn is_allocation(&self) -> bool {
        matches!(self, TreeError::Allocation { .. })
    }
}
