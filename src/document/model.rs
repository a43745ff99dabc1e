/*!
 * Arena-backed markup tree.
 *
 * Nodes live in a flat table owned by the `Document` and refer to each other
 * by `NodeId`. Children are ordered id lists, parents are plain ids, so a
 * structural edit is a splice on a single `Vec<NodeId>`.
 */

use std::fmt;

use crate::errors::MutationError;

/// Index of a node inside its `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single attribute; valueless attributes such as `data-autoplay` keep `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self { key: key.into(), value }
    }

    /// Attribute without a value
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name, lowercased by the parser
    pub tag: String,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    /// Written as `<tag/>` in the source
    pub self_closing: bool,
}

impl ElementData {
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key.eq_ignore_ascii_case(key))
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The tree root
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

/// Coarse node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    Doctype,
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only its root node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, MutationError> {
        self.nodes.get(id.0).ok_or(MutationError::UnknownNode(id.0))
    }

    /// Node payload. Panics on ids from another document.
    pub fn node(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.node(id) {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Doctype(_) => NodeType::Doctype,
        }
    }

    /// Element data, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.node(id) {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Tag name for elements
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Raw text for text nodes
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    /// Position of the node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = self.node(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Pre-order walk over `id` and everything below it
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: impl Into<String>, attributes: Vec<Attribute>) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.into(),
            attributes,
            self_closing: false,
        }))
    }

    /// Allocate a detached node of any kind
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind)
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Attach a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), MutationError> {
        self.record(parent)?;
        if self.record(child)?.parent.is_some() || child == self.root() {
            return Err(MutationError::AlreadyAttached(child.0));
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Attach a detached node immediately before `anchor` in `parent`'s children
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        anchor: NodeId,
    ) -> Result<(), MutationError> {
        self.record(parent)?;
        self.record(anchor)?;
        if self.record(new_child)?.parent.is_some() || new_child == self.root() {
            return Err(MutationError::AlreadyAttached(new_child.0));
        }
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == anchor)
            .ok_or(MutationError::AnchorNotFound {
                parent: parent.0,
                anchor: anchor.0,
            })?;
        self.nodes[parent.0].children.insert(position, new_child);
        self.nodes[new_child.0].parent = Some(parent);
        Ok(())
    }

    /// Remove `id` from its parent's children. The subtree stays in the
    /// arena and can be attached again.
    pub fn detach(&mut self, id: NodeId) -> Result<(), MutationError> {
        let parent = self
            .record(id)?
            .parent
            .ok_or(MutationError::Detached(id.0))?;
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
        Ok(())
    }

    /// Elements with the given tag, in document order
    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(self.root())
            .filter(move |id| self.tag(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }
}

/// Pre-order iterator returned by [`Document::descendants`]
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
