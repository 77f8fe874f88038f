//! The arena-backed document and its navigation and construction primitives.
use crate::error::TreeError;
use crate::node::{
    Attribute, ExternalId, Namespace, NodeData, NodeId, NodeKind, QName, is_blank,
};

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

const HTML4_LOOSE_PUBLIC: &str = "-//W3C//DTD HTML 4.0 Transitional//EN";
const HTML4_LOOSE_SYSTEM: &str = "http://www.w3.org/TR/REC-html40/loose.dtd";

/// A mutable XML or HTML document.
///
/// Nodes live in a single arena and are addressed by [`NodeId`]. A node is
/// created detached and becomes part of the tree through
/// [`Document::append_child`]. Once attached it is never moved.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    version: Option<String>,
    encoding: String,
    node_limit: Option<usize>,
}

impl Document {
    /// Creates an empty XML document with the given XML version (`1.0` when absent).
    pub fn new_xml(version: Option<&str>) -> Result<Self, TreeError> {
        Self::with_kind(NodeKind::Document, Some(version.unwrap_or("1.0").to_string()))
    }

    /// Creates an empty HTML document carrying an `html` document type.
    ///
    /// When neither identifier is given the HTML 4.0 Transitional
    /// identifiers are used.
    pub fn new_html(public: Option<&str>, system: Option<&str>) -> Result<Self, TreeError> {
        let mut doc = Self::with_kind(NodeKind::HtmlDocument, None)?;
        let (public, system) = match (public, system) {
            (None, None) => (Some(HTML4_LOOSE_PUBLIC), Some(HTML4_LOOSE_SYSTEM)),
            ids => ids,
        };
        doc.set_doctype("html", public, system)?;
        Ok(doc)
    }

    fn with_kind(kind: NodeKind, version: Option<String>) -> Result<Self, TreeError> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve(1)
            .map_err(|_| TreeError::Allocation { len: 0 })?;
        nodes.push(NodeData::new(kind));
        Ok(Document {
            nodes,
            version,
            encoding: "UTF-8".to_string(),
            node_limit: None,
        })
    }

    // --- Document-level properties ---

    pub fn document_node(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    pub fn is_html(&self) -> bool {
        self.nodes[0].kind == NodeKind::HtmlDocument
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn set_version(&mut self, version: Option<&str>) {
        self.version = version.map(str::to_string);
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &str) {
        self.encoding = encoding.to_string();
    }

    /// Caps the number of nodes this document may hold. Allocations beyond
    /// the cap fail with [`TreeError::Allocation`].
    pub fn set_node_limit(&mut self, limit: Option<usize>) {
        self.node_limit = limit;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always holds its document node, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    // --- Node inspection ---

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind
    }

    pub fn name(&self, id: NodeId) -> Option<&QName> {
        self.data(id).name.as_ref()
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.data(id).name.as_ref().map(|q| q.local.as_str())
    }

    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.data(id)
            .name
            .as_ref()
            .and_then(|q| q.namespace.as_deref())
    }

    /// Character content of text, CDATA and comment nodes, the value of a
    /// processing instruction or an entity declaration.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.data(id).content.as_deref()
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.data(id).attributes
    }

    /// Looks up an attribute by local name and namespace URI.
    pub fn attribute(&self, id: NodeId, local: &str, namespace: Option<&str>) -> Option<&str> {
        self.data(id)
            .attributes
            .iter()
            .find(|a| a.name.local == local && a.name.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    pub fn namespace_declarations(&self, id: NodeId) -> &[Namespace] {
        &self.data(id).namespaces
    }

    /// Resolves `prefix` (or the default namespace for `None`) from the
    /// declarations in scope at `id`.
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        let mut cur = Some(id);
        while let Some(node) = cur {
            if let Some(ns) = self
                .data(node)
                .namespaces
                .iter()
                .find(|ns| ns.prefix.as_deref() == prefix)
            {
                return (!ns.uri.is_empty()).then_some(ns.uri.as_str());
            }
            cur = self.parent(node);
        }
        None
    }

    pub fn external_id(&self, id: NodeId) -> Option<&ExternalId> {
        self.data(id).external_id.as_ref()
    }

    /// True for text nodes whose content is entirely whitespace.
    pub fn is_blank_node(&self, id: NodeId) -> bool {
        let node = self.data(id);
        node.kind == NodeKind::Text && node.content.as_deref().is_none_or(is_blank)
    }

    // --- Navigation ---

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).next_sibling
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).prev_sibling
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.data(id).first_child.is_some()
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// Pre-order iterator over `id` and all of its descendants.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: Some(id),
        }
    }

    /// The first element child of the document node.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(NodeId::DOCUMENT)
            .find(|&c| self.kind(c) == NodeKind::Element)
    }

    /// The document type declaration child of the document node, if any.
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::DOCUMENT)
            .find(|&c| self.kind(c) == NodeKind::DocumentType)
    }

    // --- Construction ---

    fn alloc(&mut self, data: NodeData) -> Result<NodeId, TreeError> {
        let len = self.nodes.len();
        if self.node_limit.is_some_and(|limit| len >= limit) {
            return Err(TreeError::Allocation { len });
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| TreeError::Allocation { len })?;
        self.nodes.push(data);
        Ok(NodeId::new(len))
    }

    pub fn create_element(&mut self, name: QName) -> Result<NodeId, TreeError> {
        self.alloc(NodeData::new(NodeKind::Element).with_name(name))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> Result<NodeId, TreeError> {
        self.alloc(NodeData::new(NodeKind::Text).with_content(text))
    }

    pub fn create_cdata(&mut self, text: impl Into<String>) -> Result<NodeId, TreeError> {
        self.alloc(NodeData::new(NodeKind::CData).with_content(text))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> Result<NodeId, TreeError> {
        self.alloc(NodeData::new(NodeKind::Comment).with_content(text))
    }

    pub fn create_pi(
        &mut self,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.alloc(
            NodeData::new(NodeKind::ProcessingInstruction)
                .with_name(QName::local(target))
                .with_content(value),
        )
    }

    pub fn create_entity_decl(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.alloc(
            NodeData::new(NodeKind::EntityDecl)
                .with_name(QName::local(name))
                .with_content(value),
        )
    }

    pub fn create_doctype(
        &mut self,
        name: impl Into<String>,
        public: Option<&str>,
        system: Option<&str>,
    ) -> Result<NodeId, TreeError> {
        let mut data = NodeData::new(NodeKind::DocumentType).with_name(QName::local(name));
        data.external_id = Some(ExternalId {
            public: public.map(str::to_string),
            system: system.map(str::to_string),
        });
        self.alloc(data)
    }

    pub fn set_attribute(&mut self, id: NodeId, attribute: Attribute) {
        let attrs = &mut self.data_mut(id).attributes;
        match attrs.iter_mut().find(|a| a.name.same_expanded(&attribute.name)) {
            Some(existing) => *existing = attribute,
            None => attrs.push(attribute),
        }
    }

    pub fn declare_namespace(&mut self, id: NodeId, prefix: Option<&str>, uri: &str) {
        let decls = &mut self.data_mut(id).namespaces;
        decls.retain(|ns| ns.prefix.as_deref() != prefix);
        decls.push(Namespace {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
        });
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::ForeignNode(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::ForeignNode(child));
        }
        let parent_kind = self.kind(parent);
        if !parent_kind.accepts_children() {
            return Err(TreeError::InvalidParent(parent_kind));
        }
        if child == NodeId::DOCUMENT || self.parent(child).is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        Ok(())
    }

    /// Appends a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let prev = self.data(parent).last_child;
        {
            let c = self.data_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = None;
        }
        match prev {
            Some(p) => self.data_mut(p).next_sibling = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        self.data_mut(parent).last_child = Some(child);
        Ok(())
    }

    /// Inserts a detached node immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent = self
            .parent(reference)
            .ok_or(TreeError::InvalidParent(self.kind(reference)))?;
        self.check_attachable(parent, child)?;
        let prev = self.data(reference).prev_sibling;
        {
            let c = self.data_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = Some(reference);
        }
        self.data_mut(reference).prev_sibling = Some(child);
        match prev {
            Some(p) => self.data_mut(p).next_sibling = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        Ok(())
    }

    /// Unlinks a node from its parent. The node stays in the arena and can
    /// be attached again.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let (prev, next) = {
            let d = self.data(id);
            (d.prev_sibling, d.next_sibling)
        };
        match prev {
            Some(p) => self.data_mut(p).next_sibling = next,
            None => self.data_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.data_mut(n).prev_sibling = prev,
            None => self.data_mut(parent).last_child = prev,
        }
        let d = self.data_mut(id);
        d.parent = None;
        d.prev_sibling = None;
        d.next_sibling = None;
    }

    /// Creates or replaces the document type declaration. The declaration is
    /// placed before the root element.
    pub fn set_doctype(
        &mut self,
        name: &str,
        public: Option<&str>,
        system: Option<&str>,
    ) -> Result<NodeId, TreeError> {
        let dtd = self.create_doctype(name, public, system)?;
        if let Some(old) = self.doctype() {
            self.detach(old);
        }
        match self.first_child(NodeId::DOCUMENT) {
            Some(first) => self.insert_before(first, dtd)?,
            None => self.append_child(NodeId::DOCUMENT, dtd)?,
        }
        Ok(dtd)
    }

    /// Copies node `id` of `src` into this document's arena, without
    /// children and without namespace declarations. The copy is detached.
    ///
    /// Document and document type nodes cannot be copied.
    pub fn shallow_copy(&mut self, src: &Document, id: NodeId) -> Result<NodeId, TreeError> {
        let data = src.nodes.get(id.index()).ok_or(TreeError::ForeignNode(id))?;
        match data.kind {
            NodeKind::Document | NodeKind::HtmlDocument | NodeKind::DocumentType => {
                Err(TreeError::Uncopyable(data.kind))
            }
            _ => self.alloc(data.detached_copy()),
        }
    }
}

pub struct Children<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.doc.next_sibling(cur);
        Some(cur)
    }
}

pub struct Descendants<'d> {
    doc: &'d Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = if let Some(child) = self.doc.first_child(cur) {
            Some(child)
        } else {
            let mut node = cur;
            loop {
                if node == self.root {
                    break None;
                }
                if let Some(sib) = self.doc.next_sibling(node) {
                    break Some(sib);
                }
                match self.doc.parent(node) {
                    Some(p) => node = p,
                    None => break None,
                }
            }
        };
        Some(cur)
    }
}
