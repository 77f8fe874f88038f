use crate::ast::XSLT_NAMESPACE;
use trellis_tree::{Document, NodeId, NodeKind};

/// An element of the instruction namespace met inside a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'s> {
    /// `xsl:apply-templates`, with its optional `select` expression.
    ApplyTemplates { select: Option<&'s str> },
    /// Any other instruction. Reported and skipped.
    Unsupported { name: &'s str },
}

impl<'s> Instruction<'s> {
    /// Classifies a template body node. Returns `None` for literal content.
    pub fn classify(doc: &'s Document, node: NodeId) -> Option<Self> {
        if doc.kind(node) != NodeKind::Element || doc.namespace(node) != Some(XSLT_NAMESPACE) {
            return None;
        }
        let name = doc.local_name(node)?;
        Some(match name {
            "apply-templates" => Instruction::ApplyTemplates {
                select: doc.attribute(node, "select", None),
            },
            _ => Instruction::Unsupported { name },
        })
    }
}
