//! Arena-backed XML/HTML document tree.
//!
//! This crate provides the tree primitives the transformation engine is
//! written against: node kind inspection, parent/child/sibling navigation,
//! shallow copies between documents, child attachment and blank-text
//! detection. Documents are loaded with `roxmltree` and written with
//! `quick-xml`.

pub mod document;
pub mod error;
pub mod loader;
pub mod node;
pub mod nodeset;
pub mod writer;

pub use document::{Children, Descendants, Document};
pub use error::TreeError;
pub use node::{Attribute, ExternalId, Namespace, NodeId, NodeKind, QName, is_blank};
pub use nodeset::NodeSet;
pub use writer::WriteOptions;
