//! Template-rule XML transformation.
//!
//! Re-exports the document tree and the transformation engine, and adds the
//! file-level helpers the command line front end is built on.

pub mod cli;

pub use trellis_tree::{Document, NodeId, NodeKind, NodeSet, TreeError, WriteOptions};
pub use trellis_xslt::{
    Diagnostic, DoctypeInjection, EvalContext, EvalError, OutputKind, Processor,
    SelectEvaluator, Stylesheet, TemplateMatcher, TransformConfig, TransformError,
    Transformation, XsltError, apply_stylesheet,
};
