//! Non-fatal diagnostics reported during a transformation.
//!
//! Diagnostics mark gaps in the output (unimplemented instructions, source
//! nodes the built-in rule does not handle, failed copies). They are logged,
//! forwarded to an optional caller callback and collected into the result.
use std::fmt;
use trellis_tree::NodeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An instruction-namespace element other than `apply-templates`.
    UnhandledInstruction { name: String },
    /// A source node kind the built-in template rule does not process.
    UnhandledNodeKind { kind: NodeKind },
    /// An `apply-templates` `select` with no evaluator configured.
    UnsupportedSelect { select: String },
    /// A node could not be copied; the enclosing node-processing call was abandoned.
    NodeCopyFailure { node: String, message: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnhandledInstruction { name } => {
                write!(f, "XSLT instruction not yet implemented: xsl:{}", name)
            }
            Diagnostic::UnhandledNodeKind { kind } => {
                write!(f, "Built-in rule does not handle {:?} nodes", kind)
            }
            Diagnostic::UnsupportedSelect { select } => {
                write!(f, "No select evaluator configured for select=\"{}\"", select)
            }
            Diagnostic::NodeCopyFailure { node, message } => {
                write!(f, "Copy of {} failed: {}", node, message)
            }
        }
    }
}

/// Callback invoked for every diagnostic as it is reported.
pub type DiagnosticHandler<'a> = dyn Fn(&Diagnostic) + 'a;

/// Collects diagnostics for one run.
pub(crate) struct Diagnostics<'a> {
    collected: Vec<Diagnostic>,
    handler: Option<&'a DiagnosticHandler<'a>>,
}

impl<'a> Diagnostics<'a> {
    pub(crate) fn new(handler: Option<&'a DiagnosticHandler<'a>>) -> Self {
        Diagnostics {
            collected: Vec::new(),
            handler,
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        if let Some(handler) = self.handler {
            handler(&diagnostic);
        }
        self.collected.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_report_collects_and_forwards() {
        let seen = RefCell::new(Vec::new());
        let handler = |d: &Diagnostic| seen.borrow_mut().push(d.to_string());
        let mut diagnostics = Diagnostics::new(Some(&handler));

        diagnostics.report(Diagnostic::UnhandledInstruction { name: "if".into() });
        diagnostics.report(Diagnostic::UnhandledNodeKind { kind: NodeKind::Comment });

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                "XSLT instruction not yet implemented: xsl:if".to_string(),
                "Built-in rule does not handle Comment nodes".to_string(),
            ]
        );
        assert_eq!(diagnostics.into_vec().len(), 2);
    }
}
