//! The extension point for `select` expressions.
//!
//! Expression evaluation is not part of this crate. Callers that want
//! `xsl:apply-templates select="..."` to select nodes plug in a
//! [`SelectEvaluator`].
use thiserror::Error;
use trellis_tree::{Document, NodeId, NodeSet};

/// The dynamic context an expression is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalContext {
    pub node: NodeId,
    /// 1-based position of `node` in the current node list.
    pub position: usize,
    pub size: usize,
}

impl EvalContext {
    pub fn new(node: NodeId) -> Self {
        EvalContext {
            node,
            position: 1,
            size: 1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

/// Evaluates a `select` expression to an ordered node-set of `source` nodes.
pub trait SelectEvaluator {
    fn evaluate(
        &self,
        select: &str,
        source: &Document,
        context: &EvalContext,
    ) -> Result<NodeSet, EvalError>;
}

impl<F> SelectEvaluator for F
where
    F: Fn(&str, &Document, &EvalContext) -> Result<NodeSet, EvalError>,
{
    fn evaluate(
        &self,
        select: &str,
        source: &Document,
        context: &EvalContext,
    ) -> Result<NodeSet, EvalError> {
        self(select, source, context)
    }
}
