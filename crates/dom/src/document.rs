use crate::doctype;
use crate::error::DomError;
use crate::node::{Attribute, Element, NodeData, NodeId, NodeKind, RawKind};
use std::path::Path;

/// An XML document stored as an arena of nodes.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    uri: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            uri: None,
        }
    }

    /// Parses a document from a string.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        crate::parser::parse_document(source)
    }

    /// Reads and parses a file, remembering its path as the document URI.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DomError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut document = Self::parse(&source)?;
        document.uri = Some(path.to_string_lossy().into_owned());
        Ok(document)
    }

    /// Where the document was loaded from, if anywhere.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = Some(uri.into());
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The single top-level element, if the document has one.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Strict ancestors of `id`, innermost first, ending with the document node.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn is_document(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Document)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Qualified element name.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id)
            .map(|el| el.attributes.as_slice())
            .unwrap_or_default()
    }

    /// Sets an attribute on an element. Non-element ids are ignored.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        match self.element_mut(id) {
            Some(el) => el.set_attribute(name, value),
            None => log::warn!("Ignoring attribute '{}' set on a non-element node", name),
        }
    }

    /// Resolves the namespace URI bound to `prefix` (`None` for the default
    /// namespace) in scope at `id`.
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(crate::XML_NAMESPACE);
        }
        let declaration = match prefix {
            Some(p) => format!("xmlns:{}", p),
            None => "xmlns".to_string(),
        };
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| self.attribute(node, &declaration))
            .filter(|uri| !uri.is_empty())
    }

    /// Namespace URI of an element's name.
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let el = self.element(id)?;
        self.lookup_namespace(id, el.prefix())
    }

    /// All elements in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// The raw `<!DOCTYPE ...>` markup, if present.
    pub fn doctype(&self) -> Option<&str> {
        self.children(self.root())
            .iter()
            .find_map(|&id| match self.kind(id) {
                NodeKind::Raw(RawKind::Doctype, raw) => Some(raw.as_str()),
                _ => None,
            })
    }

    /// Names of the entities declared in the doctype's internal subset.
    pub fn declared_entities(&self) -> Vec<String> {
        self.doctype()
            .map(doctype::entity_declarations)
            .unwrap_or_default()
    }

    pub fn has_entity_declarations(&self) -> bool {
        !self.declared_entities().is_empty()
    }

    /// Serializes the document back to markup.
    pub fn to_xml(&self) -> String {
        crate::serializer::serialize(self)
    }

    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends character data, merging with a preceding text sibling.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.nodes[parent.0].children.last().copied();
        if let Some(last) = last
            && let NodeKind::Text(existing) = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            return;
        }
        self.append(parent, NodeKind::Text(text.to_string()));
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}
