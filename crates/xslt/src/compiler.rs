//! Compiles a parsed stylesheet tree into a [`Stylesheet`].
use crate::ast::{OutputSettings, Stylesheet, Template, XSLT_NAMESPACE};
use crate::error::XsltError;
use crate::pattern::Pattern;
use trellis_tree::{Document, NodeId, NodeKind};

impl Stylesheet {
    /// Parses and compiles stylesheet source text.
    pub fn parse(text: &str) -> Result<Stylesheet, XsltError> {
        Self::compile(Document::parse(text)?)
    }

    /// Compiles an already parsed stylesheet document.
    pub fn compile(doc: Document) -> Result<Stylesheet, XsltError> {
        let root = doc
            .root_element()
            .ok_or_else(|| XsltError::Compilation("Stylesheet has no document element".into()))?;
        if !is_xslt_element(&doc, root, "stylesheet") && !is_xslt_element(&doc, root, "transform") {
            return Err(XsltError::Compilation(format!(
                "Document element <{}> is not xsl:stylesheet or xsl:transform",
                doc.name(root).map(|n| n.to_string()).unwrap_or_default()
            )));
        }

        let mut builder = CompilerBuilder {
            doc: &doc,
            templates: Vec::new(),
            output: OutputSettings::default(),
        };
        for child in doc.children(root) {
            if doc.kind(child) != NodeKind::Element {
                continue;
            }
            if doc.namespace(child) != Some(XSLT_NAMESPACE) {
                log::debug!("Ignoring top-level user element <{}>", display_name(&doc, child));
                continue;
            }
            match doc.local_name(child) {
                Some("output") => builder.handle_output(child)?,
                Some("template") => builder.handle_template(child)?,
                _ => log::debug!(
                    "Ignoring unsupported top-level element <{}>",
                    display_name(&doc, child)
                ),
            }
        }

        let CompilerBuilder {
            templates, output, ..
        } = builder;
        log::debug!("Compiled stylesheet with {} template(s)", templates.len());
        Ok(Stylesheet {
            doc,
            templates,
            output,
        })
    }
}

struct CompilerBuilder<'d> {
    doc: &'d Document,
    templates: Vec<Template>,
    output: OutputSettings,
}

impl CompilerBuilder<'_> {
    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.attribute(node, name, None).map(str::to_string)
    }

    fn handle_output(&mut self, node: NodeId) -> Result<(), XsltError> {
        let indent = match self.doc.attribute(node, "indent", None) {
            None => None,
            Some("yes") => Some(true),
            Some("no") => Some(false),
            Some(other) => {
                return Err(XsltError::Compilation(format!(
                    "xsl:output indent must be 'yes' or 'no', found '{}'",
                    other
                )));
            }
        };
        self.output.merge(OutputSettings {
            method: self.attr(node, "method"),
            version: self.attr(node, "version"),
            encoding: self.attr(node, "encoding"),
            doctype_public: self.attr(node, "doctype-public"),
            doctype_system: self.attr(node, "doctype-system"),
            indent,
        });
        Ok(())
    }

    fn handle_template(&mut self, node: NodeId) -> Result<(), XsltError> {
        let doc = self.doc;
        let pattern = doc
            .attribute(node, "match", None)
            .map(|text| {
                Pattern::parse_with(text, |prefix| {
                    doc.lookup_namespace(node, Some(prefix)).map(str::to_string)
                })
            })
            .transpose()?;
        let name = self.attr(node, "name");
        if pattern.is_none() && name.is_none() {
            return Err(XsltError::Compilation(
                "xsl:template must have a 'match' or a 'name' attribute".into(),
            ));
        }
        let priority = doc
            .attribute(node, "priority", None)
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|e| XsltError::FloatParse(p.to_string(), e))
            })
            .transpose()?;

        self.templates.push(Template {
            pattern,
            name,
            mode: self.attr(node, "mode"),
            priority,
            content: node,
            index: self.templates.len(),
        });
        Ok(())
    }
}

pub(crate) fn is_xslt_element(doc: &Document, node: NodeId, local: &str) -> bool {
    doc.kind(node) == NodeKind::Element
        && doc.namespace(node) == Some(XSLT_NAMESPACE)
        && doc.local_name(node) == Some(local)
}

fn display_name(doc: &Document, node: NodeId) -> String {
    doc.name(node).map(|n| n.to_string()).unwrap_or_default()
}
