//! In-memory page model
//!
//! An arena-backed DOM tree that the augmentation pass reads and mutates.
//! Nodes are addressed by [`NodeId`] and never freed: a detached node stays in
//! the arena and can be re-inserted, which keeps ids stable for the lifetime
//! of a [`Document`].

pub mod parser;
pub mod selector;
pub mod serialize;
pub mod walker;

use thiserror::Error;

pub use parser::parse_html;
pub use selector::{SelectorError, SelectorList};
pub use serialize::{inner_html, outer_html};
pub use walker::TextWalker;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),

    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot insert {child:?} under {parent:?}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name
    pub tag: String,
    /// Attributes in source order, names lower-cased
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A page: one document root plus every node ever created for it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    // ---- construction -------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    // ---- inspection ---------------------------------------------------

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    /// Value of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&parent| self.is_element(parent))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.is_element(child))
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.is_element(child))
    }

    /// Ancestors from the parent up to the document root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Every node below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Whether `id` is connected to the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|ancestor| ancestor == self.root())
    }

    /// Concatenated text of every text node below `id` (or the node's own text).
    pub fn text_content(&self, id: NodeId) -> String {
        match self.data(id) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Comment(_)) | None => String::new(),
            Some(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|node| self.text(node))
                .collect(),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .map(|element| element.has_class(class))
            .unwrap_or(false)
    }

    /// Nearest ancestor-or-self element with the given tag.
    pub fn closest_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| {
                self.tag_name(node)
                    .map(|name| name.eq_ignore_ascii_case(tag))
                    .unwrap_or(false)
            })
    }

    // ---- attribute mutation --------------------------------------------

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => {
                match element.attributes.iter_mut().find(|(key, _)| *key == name) {
                    Some((_, existing)) => *existing = value.to_string(),
                    None => element.attributes.push((name, value.to_string())),
                }
                Ok(())
            }
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let joined = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &joined)
    }

    /// Replace the inline style with the given declarations, in order.
    pub fn set_style(&mut self, id: NodeId, declarations: &[(&str, &str)]) -> Result<(), DomError> {
        let style = declarations
            .iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "style", &style)
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let old_children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old_children {
            self.node_mut(child)?.parent = None;
        }
        let text_node = self.create_text(text);
        self.append_child(id, text_node)
    }

    // ---- tree mutation -------------------------------------------------

    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node_mut(id)?.parent.take() {
            self.node_mut(parent)?.children.retain(|&child| child != id);
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if !self.contains(child) {
            return Err(DomError::UnknownNode(child));
        }
        if child == self.root() {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "the document node cannot be inserted",
            });
        }
        if child == parent || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "a node cannot be inserted inside itself",
            });
        }
        if matches!(self.data(parent), Some(NodeData::Text(_) | NodeData::Comment(_))) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "character data cannot have children",
            });
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Insert `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        if node == reference {
            return Err(DomError::HierarchyRequest {
                parent,
                child: node,
                reason: "a node cannot follow itself",
            });
        }
        self.check_insertable(parent, node)?;
        self.detach(node)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&sibling| sibling == reference)
            .ok_or(DomError::Detached(reference))?;
        siblings.insert(position + 1, node);
        self.node_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Swap `node` out of the tree for `replacements`, keeping their order.
    pub fn replace_with(&mut self, node: NodeId, replacements: &[NodeId]) -> Result<(), DomError> {
        let parent = self.parent(node).ok_or(DomError::Detached(node))?;
        for &replacement in replacements {
            self.check_insertable(parent, replacement)?;
            if replacement == node {
                return Err(DomError::HierarchyRequest {
                    parent,
                    child: replacement,
                    reason: "a node cannot replace itself",
                });
            }
        }
        for &replacement in replacements {
            self.detach(replacement)?;
        }
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&sibling| sibling == node)
            .ok_or(DomError::Detached(node))?;
        siblings.splice(position..=position, replacements.iter().copied());
        self.node_mut(node)?.parent = None;
        for &replacement in replacements {
            self.node_mut(replacement)?.parent = Some(parent);
        }
        Ok(())
    }

    // ---- selectors -----------------------------------------------------

    pub fn matches(&self, id: NodeId, selector: &SelectorList) -> bool {
        selector.matches(self, id)
    }

    /// Every element under the document matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.query_selector_all_within(self.root(), selector)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Elements strictly below `scope` that match `selector`.
    pub fn query_selector_all_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.select_within(scope, &selector))
    }

    pub fn select_within(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| self.is_element(node) && selector.matches(self, node))
            .collect()
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        let span = doc.create_element("span");
        let text = doc.create_text("hello");
        doc.append_child(doc.root(), div).unwrap();
        doc.append_child(div, span).unwrap();
        doc.append_child(span, text).unwrap();
        (doc, div, span, text)
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let (doc, div, _, _) = sample();
        assert_eq!(doc.tag_name(div), Some("div"));
    }

    #[test]
    fn test_text_content_and_ancestors() {
        let (doc, div, span, text) = sample();
        assert_eq!(doc.text_content(div), "hello");
        assert_eq!(doc.ancestors(text).collect::<Vec<_>>(), vec![span, div, doc.root()]);
        assert!(doc.is_attached(text));
        assert_eq!(doc.closest_tag(text, "div"), Some(div));
        assert_eq!(doc.closest_tag(div, "div"), Some(div));
    }

    #[test]
    fn test_insert_after_places_sibling() {
        let (mut doc, div, span, _) = sample();
        let em = doc.create_element("em");
        doc.insert_after(span, em).unwrap();
        assert_eq!(doc.children(div), &[span, em]);
        assert_eq!(doc.last_element_child(div), Some(em));
    }

    #[test]
    fn test_insert_after_detached_reference_fails() {
        let mut doc = Document::new();
        let lonely = doc.create_element("p");
        let other = doc.create_element("p");
        assert_eq!(doc.insert_after(lonely, other), Err(DomError::Detached(lonely)));
    }

    #[test]
    fn test_replace_with_sequence() {
        let (mut doc, _, span, text) = sample();
        let a = doc.create_text("a");
        let b = doc.create_element("b");
        doc.replace_with(text, &[a, b]).unwrap();
        assert_eq!(doc.children(span), &[a, b]);
        assert_eq!(doc.parent(text), None);
        assert_eq!(doc.parent(b), Some(span));
    }

    #[test]
    fn test_cannot_append_ancestor_into_descendant() {
        let (mut doc, div, span, _) = sample();
        assert!(matches!(
            doc.append_child(span, div),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_classes_and_style() {
        let (mut doc, div, _, _) = sample();
        doc.add_class(div, "one").unwrap();
        doc.add_class(div, "two").unwrap();
        doc.add_class(div, "one").unwrap();
        assert_eq!(doc.attribute(div, "class"), Some("one two"));
        assert!(doc.has_class(div, "two"));

        doc.set_style(div, &[("color", "red"), ("cursor", "pointer")]).unwrap();
        assert_eq!(doc.attribute(div, "style"), Some("color: red; cursor: pointer;"));
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let (mut doc, _, span, text) = sample();
        doc.set_text_content(span, "bye").unwrap();
        assert_eq!(doc.text_content(span), "bye");
        assert_eq!(doc.parent(text), None);
    }

    #[test]
    fn test_unknown_node_is_reported() {
        let (mut doc, div, _, _) = sample();
        let foreign = NodeId(999);
        assert_eq!(doc.append_child(div, foreign), Err(DomError::UnknownNode(foreign)));
        assert_eq!(doc.text_content(foreign), "");
        assert!(doc.children(foreign).is_empty());
    }
}
