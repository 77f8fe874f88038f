//! Serializes a [`Document`] to XML text using `quick-xml`.
//!
//! Namespace declarations are emitted where the written names need them, so
//! a tree assembled from shallow copies always serializes well-formed.
use crate::document::{Document, XML_NAMESPACE};
use crate::error::TreeError;
use crate::node::{NodeId, NodeKind, QName};
use quick_xml::Writer;
use quick_xml::events::{
    BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event,
};
use std::io::Write;

/// Options controlling [`Document::write_to`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub indent: bool,
    pub omit_declaration: bool,
}

type Scope = Vec<(Option<String>, String)>;

const XML_PREFIX: &str = "xml";

struct NamespaceScopes {
    scopes: Vec<Scope>,
    generated: usize,
    /// Prefixes the element being written uses for its attributes.
    reserved: Vec<String>,
}

impl NamespaceScopes {
    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some(XML_PREFIX) {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.iter().rev())
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn bind(&mut self, binding: (Option<String>, String)) {
        if let Some(top) = self.scopes.last_mut() {
            top.push(binding);
        }
    }

    /// Returns the binding to declare, if `name` is not already in scope.
    /// The `xml` prefix is always bound and never declared.
    fn require(&mut self, name: &QName, is_attribute: bool) -> Option<(Option<String>, String)> {
        match (&name.namespace, &name.prefix) {
            (Some(uri), _) if uri == XML_NAMESPACE => None,
            (Some(uri), Some(prefix)) => {
                (self.lookup(Some(prefix)) != Some(uri.as_str())).then(|| (Some(prefix.clone()), uri.clone()))
            }
            (Some(uri), None) if is_attribute => Some((Some(self.fresh_prefix()), uri.clone())),
            (Some(uri), None) => {
                (self.lookup(None) != Some(uri.as_str())).then(|| (None, uri.clone()))
            }
            (None, _) if !is_attribute => {
                // An unqualified element under a default namespace must undeclare it.
                self.lookup(None)
                    .is_some_and(|uri| !uri.is_empty())
                    .then(|| (None, String::new()))
            }
            (None, _) => None,
        }
    }

    /// Generates an `ns{n}` prefix that is neither bound in scope nor
    /// written by an attribute of the current element.
    fn fresh_prefix(&mut self) -> String {
        loop {
            self.generated += 1;
            let prefix = format!("ns{}", self.generated);
            if self.lookup(Some(&prefix)).is_none() && !self.reserved.contains(&prefix) {
                return prefix;
            }
        }
    }
}

/// The prefix a name is written with when no new binding is declared for it.
fn written_prefix(name: &QName) -> Option<String> {
    match name.namespace.as_deref() {
        Some(XML_NAMESPACE) => Some(XML_PREFIX.to_string()),
        _ => name.prefix.clone(),
    }
}

fn lexical(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    }
}

fn xmlns_name(prefix: Option<&str>) -> String {
    match prefix {
        Some(p) => format!("xmlns:{}", p),
        None => "xmlns".to_string(),
    }
}

impl Document {
    /// Serializes the whole document to a string.
    pub fn to_xml_string(&self) -> Result<String, TreeError> {
        self.to_xml_string_with(WriteOptions::default())
    }

    pub fn to_xml_string_with(&self, options: WriteOptions) -> Result<String, TreeError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, options)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn write_to<W: Write>(&self, out: W, options: WriteOptions) -> Result<(), TreeError> {
        let mut writer = if options.indent {
            Writer::new_with_indent(out, b' ', 2)
        } else {
            Writer::new(out)
        };
        if !options.omit_declaration && !self.is_html() {
            writer.write_event(Event::Decl(BytesDecl::new(
                self.version().unwrap_or("1.0"),
                Some(self.encoding()),
                None,
            )))?;
        }
        let mut scopes = NamespaceScopes {
            scopes: Vec::new(),
            generated: 0,
            reserved: Vec::new(),
        };
        for child in self.children(NodeId::DOCUMENT) {
            self.write_node(&mut writer, &mut scopes, child)?;
        }
        Ok(())
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut Writer<W>,
        scopes: &mut NamespaceScopes,
        id: NodeId,
    ) -> Result<(), TreeError> {
        let text = self.text(id).unwrap_or_default();
        match self.kind(id) {
            NodeKind::Element => self.write_element(writer, scopes, id)?,
            NodeKind::Text => writer.write_event(Event::Text(BytesText::new(text)))?,
            NodeKind::CData => writer.write_event(Event::CData(BytesCData::new(text)))?,
            NodeKind::Comment => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text)))?
            }
            NodeKind::ProcessingInstruction => {
                let target = self.local_name(id).unwrap_or_default();
                let content = if text.is_empty() {
                    target.to_string()
                } else {
                    format!("{} {}", target, text)
                };
                writer.write_event(Event::PI(BytesPI::new(content)))?
            }
            NodeKind::DocumentType => {
                let content = self.doctype_content(id);
                writer.write_event(Event::DocType(BytesText::from_escaped(content)))?
            }
            // Entity declarations are written as part of their document type.
            NodeKind::EntityDecl => {}
            NodeKind::Document | NodeKind::HtmlDocument => {
                for child in self.children(id) {
                    self.write_node(writer, scopes, child)?;
                }
            }
        }
        Ok(())
    }

    fn doctype_content(&self, id: NodeId) -> String {
        let mut content = self.local_name(id).unwrap_or_default().to_string();
        if let Some(ids) = self.external_id(id) {
            match (&ids.public, &ids.system) {
                (Some(public), Some(system)) => {
                    content.push_str(&format!(" PUBLIC \"{}\" \"{}\"", public, system))
                }
                (Some(public), None) => content.push_str(&format!(" PUBLIC \"{}\"", public)),
                (None, Some(system)) => content.push_str(&format!(" SYSTEM \"{}\"", system)),
                (None, None) => {}
            }
        }
        let entities: Vec<String> = self
            .children(id)
            .filter(|&c| self.kind(c) == NodeKind::EntityDecl)
            .map(|c| {
                format!(
                    "<!ENTITY {} \"{}\">",
                    self.local_name(c).unwrap_or_default(),
                    self.text(c).unwrap_or_default()
                )
            })
            .collect();
        if !entities.is_empty() {
            content.push_str(&format!(" [{}]", entities.concat()));
        }
        content
    }

    fn write_element<W: Write>(
        &self,
        writer: &mut Writer<W>,
        scopes: &mut NamespaceScopes,
        id: NodeId,
    ) -> Result<(), TreeError> {
        let Some(name) = self.name(id) else {
            return Ok(());
        };

        scopes.scopes.push(
            self.namespace_declarations(id)
                .iter()
                .map(|ns| (ns.prefix.clone(), ns.uri.clone()))
                .collect(),
        );

        let mut declared: Scope = Vec::new();
        let mut element_prefix = written_prefix(name);
        if let Some(binding) = scopes.require(name, false) {
            element_prefix = binding.0.clone();
            scopes.bind(binding.clone());
            declared.push(binding);
        }
        scopes.reserved = self
            .attributes(id)
            .iter()
            .filter_map(|a| a.name.prefix.clone())
            .collect();
        let mut attrs = Vec::new();
        for attr in self.attributes(id) {
            let prefix = match scopes.require(&attr.name, true) {
                Some(binding) => {
                    let prefix = binding.0.clone();
                    scopes.bind(binding.clone());
                    declared.push(binding);
                    prefix
                }
                None => written_prefix(&attr.name),
            };
            attrs.push((lexical(prefix.as_deref(), &attr.name.local), attr.value.as_str()));
        }

        let tag = lexical(element_prefix.as_deref(), &name.local);
        let mut start = BytesStart::new(tag.as_str());
        for ns in self.namespace_declarations(id) {
            start.push_attribute((xmlns_name(ns.prefix.as_deref()).as_str(), ns.uri.as_str()));
        }
        for (prefix, uri) in &declared {
            start.push_attribute((xmlns_name(prefix.as_deref()).as_str(), uri.as_str()));
        }
        for (key, value) in &attrs {
            start.push_attribute((key.as_str(), *value));
        }

        if self.has_children(id) {
            writer.write_event(Event::Start(start))?;
            for child in self.children(id) {
                self.write_node(writer, scopes, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        } else {
            writer.write_event(Event::Empty(start))?;
        }
        scopes.scopes.pop();
        Ok(())
    }
}
