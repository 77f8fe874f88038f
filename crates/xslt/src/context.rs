//! Mutable state of a single transformation run.
use crate::ast::Stylesheet;
use crate::diagnostics::{Diagnostic, DiagnosticHandler, Diagnostics};
use crate::error::TransformError;
use crate::evaluator::{EvalContext, SelectEvaluator};
use crate::matcher::TemplateMatcher;
use trellis_tree::{Document, NodeId, NodeSet};

/// The kind of output document a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Xml,
    Html,
    Text,
}

/// Everything a run needs while walking templates and source nodes.
///
/// The context owns the output document. It borrows the stylesheet, the
/// source document and the pluggable collaborators for the length of the
/// run, and is consumed by [`TransformContext::finish`].
pub struct TransformContext<'a> {
    pub(crate) stylesheet: &'a Stylesheet,
    pub(crate) matcher: &'a dyn TemplateMatcher,
    pub(crate) evaluator: Option<&'a dyn SelectEvaluator>,
    pub(crate) source: &'a Document,
    pub(crate) output_kind: OutputKind,
    pub(crate) current_node: NodeId,
    pub(crate) current_node_set: NodeSet,
    pub(crate) output: Document,
    /// Output node new copies are attached under.
    pub(crate) insert: NodeId,
    pub(crate) expr_context: EvalContext,
    pub(crate) diagnostics: Diagnostics<'a>,
}

impl<'a> TransformContext<'a> {
    /// Creates a context writing into `output`. The insertion point starts at
    /// the output document node and the current node at the source document
    /// node.
    pub fn new(
        stylesheet: &'a Stylesheet,
        source: &'a Document,
        output_kind: OutputKind,
        output: Document,
    ) -> Self {
        TransformContext {
            stylesheet,
            matcher: stylesheet,
            evaluator: None,
            source,
            output_kind,
            current_node: NodeId::DOCUMENT,
            current_node_set: NodeSet::new(),
            output,
            insert: NodeId::DOCUMENT,
            expr_context: EvalContext::new(NodeId::DOCUMENT),
            diagnostics: Diagnostics::new(None),
        }
    }

    /// Templates returned by `matcher` must belong to this context's stylesheet.
    pub fn with_matcher(mut self, matcher: &'a dyn TemplateMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Option<&'a dyn SelectEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_diagnostic_handler(mut self, handler: Option<&'a DiagnosticHandler<'a>>) -> Self {
        self.diagnostics = Diagnostics::new(handler);
        self
    }

    pub fn stylesheet(&self) -> &'a Stylesheet {
        self.stylesheet
    }

    pub fn source(&self) -> &'a Document {
        self.source
    }

    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    pub fn output(&self) -> &Document {
        &self.output
    }

    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    pub fn current_node_set(&self) -> &NodeSet {
        &self.current_node_set
    }

    pub fn insert(&self) -> NodeId {
        self.insert
    }

    /// Makes `root` the current node and sole member of the current node-set.
    pub fn seed(&mut self, root: NodeId) {
        self.insert = self.output.document_node();
        self.current_node = root;
        self.current_node_set = NodeSet::singleton(root);
        self.expr_context = EvalContext::new(root);
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    /// Turns a node copy failure into a diagnostic. Every other outcome is
    /// passed through.
    pub(crate) fn recover(&mut self, result: Result<(), TransformError>) -> Result<(), TransformError> {
        match result {
            Err(TransformError::NodeCopy { node, source }) => {
                self.report(Diagnostic::NodeCopyFailure {
                    node,
                    message: source.to_string(),
                });
                Ok(())
            }
            other => other,
        }
    }

    /// Ends the run, handing back the output document and the diagnostics
    /// reported so far.
    pub fn finish(self) -> (Document, Vec<Diagnostic>) {
        let TransformContext {
            output,
            diagnostics,
            ..
        } = self;
        (output, diagnostics.into_vec())
    }
}
