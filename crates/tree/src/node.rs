//! Node identifiers, kinds and the per-node payload stored in a document arena.
use std::fmt;

/// Index of a node inside the arena of one [`crate::Document`].
///
/// Ids are only meaningful for the document that allocated them. The
/// document node of every document is [`NodeId::DOCUMENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const DOCUMENT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The type of a node, aligned with the libxml-style document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    HtmlDocument,
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    DocumentType,
    EntityDecl,
}

impl NodeKind {
    pub fn is_document(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::HtmlDocument)
    }

    /// Kinds that may carry a child list.
    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::HtmlDocument | NodeKind::Element | NodeKind::DocumentType
        )
    }
}

/// A qualified name. `namespace` is the resolved URI; `prefix` is kept so the
/// writer can reproduce the lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        QName {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    pub fn namespaced(
        prefix: Option<&str>,
        local: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        QName {
            prefix: prefix.map(str::to_string),
            local: local.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// True when both names have the same local part and namespace URI.
    pub fn same_expanded(&self, other: &QName) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) made on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: Option<String>,
    pub uri: String,
}

/// Public and system identifiers of a document type declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalId {
    pub public: Option<String>,
    pub system: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<QName>,
    pub(crate) content: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) namespaces: Vec<Namespace>,
    pub(crate) external_id: Option<ExternalId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            name: None,
            content: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            external_id: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub(crate) fn with_name(mut self, name: QName) -> Self {
        self.name = Some(name);
        self
    }

    pub(crate) fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Copies everything except tree links and namespace declarations.
    pub(crate) fn detached_copy(&self) -> Self {
        NodeData {
            kind: self.kind,
            name: self.name.clone(),
            content: self.content.clone(),
            attributes: self.attributes.clone(),
            namespaces: Vec::new(),
            external_id: self.external_id.clone(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// True when `text` consists only of XML whitespace (space, tab, CR, LF).
/// The empty string is blank.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}
