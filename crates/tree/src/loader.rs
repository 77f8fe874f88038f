//! Builds a [`Document`] from XML text using `roxmltree`.
use crate::document::{Document, XML_NAMESPACE};
use crate::error::TreeError;
use crate::node::{Attribute, NodeId, QName};
use roxmltree::{Node, NodeType};

const XML_PREFIX: &str = "xml";

impl Document {
    /// Parses XML text into a new document.
    pub fn parse(text: &str) -> Result<Self, TreeError> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let parsed = roxmltree::Document::parse_with_options(text, options)?;

        let mut doc = Document::new_xml(None)?;
        for child in parsed.root().children() {
            load_node(&mut doc, NodeId::DOCUMENT, child)?;
        }
        log::trace!("Loaded document with {} nodes", doc.len());
        Ok(doc)
    }
}

fn load_node(doc: &mut Document, parent: NodeId, node: Node<'_, '_>) -> Result<(), TreeError> {
    let id = match node.node_type() {
        NodeType::Element => {
            let id = doc.create_element(element_name(node))?;
            for ns in declared_namespaces(node) {
                doc.declare_namespace(id, ns.0, ns.1);
            }
            for attr in node.attributes() {
                let name = match attr.namespace() {
                    Some(uri) => QName {
                        prefix: attribute_prefix(node, uri),
                        local: attr.name().to_string(),
                        namespace: Some(uri.to_string()),
                    },
                    None => QName::local(attr.name()),
                };
                doc.set_attribute(id, Attribute::new(name, attr.value()));
            }
            id
        }
        NodeType::Text => doc.create_text(node.text().unwrap_or_default())?,
        NodeType::Comment => doc.create_comment(node.text().unwrap_or_default())?,
        NodeType::PI => match node.pi() {
            Some(pi) => doc.create_pi(pi.target, pi.value.unwrap_or_default())?,
            None => return Ok(()),
        },
        NodeType::Root => return Ok(()),
    };
    doc.append_child(parent, id)?;
    for child in node.children() {
        load_node(doc, id, child)?;
    }
    Ok(())
}

fn element_name(node: Node<'_, '_>) -> QName {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(XML_NAMESPACE) => QName::namespaced(Some(XML_PREFIX), tag.name(), XML_NAMESPACE),
        Some(uri) => {
            // Prefer the default binding: roxmltree does not keep the prefix
            // the element was written with.
            let default_bound = node
                .namespaces()
                .any(|ns| ns.name().is_none() && ns.uri() == uri);
            let prefix = if default_bound {
                None
            } else {
                node.namespaces()
                    .find(|ns| ns.uri() == uri)
                    .and_then(|ns| ns.name())
                    .map(str::to_string)
            };
            QName {
                prefix,
                local: tag.name().to_string(),
                namespace: Some(uri.to_string()),
            }
        }
        None => QName::local(tag.name()),
    }
}

fn attribute_prefix(node: Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some(XML_PREFIX.to_string());
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
        .map(str::to_string)
}

/// Namespace bindings introduced on `node` itself, as opposed to inherited
/// from its parent element.
fn declared_namespaces<'a>(node: Node<'a, '_>) -> Vec<(Option<&'a str>, &'a str)> {
    let parent = node.parent().filter(|p| p.is_element());
    node.namespaces()
        .filter(|ns| ns.name() != Some(XML_PREFIX))
        .filter(|ns| {
            parent.is_none_or(|p| {
                !p.namespaces()
                    .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
            })
        })
        .map(|ns| (ns.name(), ns.uri()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_parse_keeps_structure_and_whitespace() {
        let doc = Document::parse("<a>\n  <b x=\"1\"/>text<c/></a>").unwrap();
        let a = doc.root_element().unwrap();
        let kids: Vec<_> = doc.children(a).map(|c| doc.kind(c)).collect();
        assert_eq!(
            kids,
            vec![NodeKind::Text, NodeKind::Element, NodeKind::Text, NodeKind::Element]
        );
        let b = doc.children(a).nth(1).unwrap();
        assert_eq!(doc.attribute(b, "x", None), Some("1"));
        assert!(doc.is_blank_node(doc.first_child(a).unwrap()));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
            <xsl:template match="/"><out xmlns="urn:out" xsl:foo="v"/></xsl:template>
        </xsl:stylesheet>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element().unwrap();
        let name = doc.name(root).unwrap();
        assert_eq!(name.prefix.as_deref(), Some("xsl"));
        assert_eq!(name.namespace.as_deref(), Some("http://www.w3.org/1999/XSL/Transform"));
        assert_eq!(doc.namespace_declarations(root).len(), 1);

        let out = doc
            .descendants(root)
            .find(|&n| doc.local_name(n) == Some("out"))
            .unwrap();
        assert_eq!(doc.namespace(out), Some("urn:out"));
        assert_eq!(doc.name(out).unwrap().prefix, None);
        assert_eq!(
            doc.attribute(out, "foo", Some("http://www.w3.org/1999/XSL/Transform")),
            Some("v")
        );
        // Only the newly introduced default namespace is declared on <out>.
        assert_eq!(doc.namespace_declarations(out).len(), 1);
    }

    #[test]
    fn test_parse_comments_and_pis() {
        let doc = Document::parse("<?style sheet?><a><!-- note --></a>").unwrap();
        let pi = doc.first_child(NodeId::DOCUMENT).unwrap();
        assert_eq!(doc.kind(pi), NodeKind::ProcessingInstruction);
        assert_eq!(doc.local_name(pi), Some("style"));
        assert_eq!(doc.text(pi), Some("sheet"));
        let a = doc.root_element().unwrap();
        assert_eq!(doc.text(doc.first_child(a).unwrap()), Some(" note "));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Document::parse("<a>"), Err(TreeError::Parse(_))));
    }
}
