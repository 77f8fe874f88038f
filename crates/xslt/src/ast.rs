//! The compiled form of a stylesheet: template rules and output settings.
//!
//! Template bodies are not lowered into an instruction list. A [`Template`]
//! points at its `xsl:template` element inside the stylesheet document, and
//! the executor walks that subtree directly.
use crate::pattern::Pattern;
use trellis_tree::{Document, NodeId};

/// The XSLT instruction namespace.
pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Attributes of the merged `xsl:output` declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub method: Option<String>,
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub doctype_public: Option<String>,
    pub doctype_system: Option<String>,
    pub indent: Option<bool>,
}

impl OutputSettings {
    /// True when either document type identifier is declared.
    pub fn has_doctype(&self) -> bool {
        self.doctype_public.is_some() || self.doctype_system.is_some()
    }

    /// Overrides every attribute `later` declares.
    pub(crate) fn merge(&mut self, later: OutputSettings) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.method, later.method);
        take(&mut self.version, later.version);
        take(&mut self.encoding, later.encoding);
        take(&mut self.doctype_public, later.doctype_public);
        take(&mut self.doctype_system, later.doctype_system);
        take(&mut self.indent, later.indent);
    }
}

/// A single template rule.
#[derive(Debug, Clone)]
pub struct Template {
    pub pattern: Option<Pattern>,
    pub name: Option<String>,
    pub mode: Option<String>,
    /// Explicit `priority` attribute. Overrides the pattern's default priority.
    pub priority: Option<f64>,
    /// The `xsl:template` element. Its children are the template body.
    pub content: NodeId,
    /// Position among the stylesheet's templates, in document order.
    pub index: usize,
}

/// A compiled stylesheet. Immutable once compiled and safe to share
/// between concurrent runs.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub(crate) doc: Document,
    pub(crate) templates: Vec<Template>,
    pub(crate) output: OutputSettings,
}

impl Stylesheet {
    /// The stylesheet tree that template bodies live in.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn output(&self) -> &OutputSettings {
        &self.output
    }
}
