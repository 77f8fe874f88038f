use crate::diagnostics::Diagnostic;
use thiserror::Error;
use trellis_tree::TreeError;

/// Errors raised while compiling a stylesheet.
#[derive(Error, Debug)]
pub enum XsltError {
    #[error("Stylesheet tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Pattern parse error in '{0}': {1}")]
    PatternParse(String, String),

    #[error("Template compilation error: {0}")]
    Compilation(String),

    #[error("Float parsing error '{0}': {1}")]
    FloatParse(String, std::num::ParseFloatError),
}

/// Errors that abort a transformation run. When one of these is returned no
/// output document is handed to the caller.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Allocation failed: {0}")]
    Allocation(#[source] TreeError),

    #[error("Source document has no root element")]
    NoRootElement,

    #[error("Unsupported output method '{0}'")]
    UnsupportedOutputMethod(String),

    /// Aborts the current node-processing call only. Callers that iterate
    /// over nodes turn it into a [`Diagnostic::NodeCopyFailure`].
    #[error("Failed to copy {node}: {source}")]
    NodeCopy {
        node: String,
        #[source]
        source: TreeError,
    },

    #[error("Select evaluation failed for '{select}': {message}")]
    Evaluation { select: String, message: String },

    #[error("Output tree error: {0}")]
    Tree(#[source] TreeError),

    #[error("{} diagnostic(s) reported in strict mode", .0.len())]
    Strict(Vec<Diagnostic>),
}

impl TransformError {
    /// Classifies a tree failure met while building output structure.
    pub(crate) fn from_tree(err: TreeError) -> Self {
        if err.is_allocation() {
            TransformError::Allocation(err)
        } else {
            TransformError::Tree(err)
        }
    }

    /// Classifies a tree failure met while copying `node` into the output.
    /// Arena exhaustion stays fatal.
    pub(crate) fn from_copy(node: String, err: TreeError) -> Self {
        if err.is_allocation() {
            TransformError::Allocation(err)
        } else {
            TransformError::NodeCopy { node, source: err }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::NodeKind;

    #[test]
    fn test_copy_errors_are_classified() {
        let err = TransformError::from_copy("doctype".into(), TreeError::Uncopyable(NodeKind::DocumentType));
        assert!(matches!(err, TransformError::NodeCopy { .. }));

        let err = TransformError::from_copy("p".into(), TreeError::Allocation { len: 8 });
        assert!(matches!(err, TransformError::Allocation(_)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TransformError::UnsupportedOutputMethod("pdf".into()).to_string(),
            "Unsupported output method 'pdf'"
        );
        assert_eq!(
            TransformError::NoRootElement.to_string(),
            "Source document has no root element"
        );
    }
}
