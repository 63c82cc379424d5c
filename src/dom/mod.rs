//! Arena DOM for saved-post HTML
//!
//! The preview does not render HTML strings directly; it parses them into a
//! small arena DOM (document, element and text nodes addressed by handle)
//! and walks that. Parsing is done by [`parser`] on top of html5ever, so
//! malformed input is tolerated to exactly the degree the HTML5 algorithm
//! tolerates it.

pub mod parser;

use html5ever::QualName;

pub use parser::{parse, DomCreationError};

/// Index of a node within a [`PostDom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) usize);

/// A node in the parsed post.
#[derive(Debug, Clone, PartialEq)]
pub enum PostNode {
    Document(DocumentNode),
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentNode {
    pub children: Vec<NodeHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub name: QualName,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeHandle>,
}

impl ElementNode {
    /// Lowercase local tag name.
    pub fn tag(&self) -> &str {
        self.name.local.as_ref()
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: String,
}

/// The parsed representation of a saved post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDom {
    nodes: Vec<PostNode>,
    document: NodeHandle,
}

impl Default for PostDom {
    fn default() -> Self {
        Self::new()
    }
}

impl PostDom {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![PostNode::Document(DocumentNode::default())],
            document: NodeHandle(0),
        }
    }

    pub fn document(&self) -> NodeHandle {
        self.document
    }

    pub(crate) fn add_node(&mut self, node: PostNode) -> NodeHandle {
        self.nodes.push(node);
        NodeHandle(self.nodes.len() - 1)
    }

    pub fn node(&self, handle: NodeHandle) -> &PostNode {
        &self.nodes[handle.0]
    }

    pub(crate) fn node_mut(&mut self, handle: NodeHandle) -> &mut PostNode {
        &mut self.nodes[handle.0]
    }

    /// Children of a container node; text nodes have none.
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        match self.node(handle) {
            PostNode::Document(doc) => &doc.children,
            PostNode::Element(el) => &el.children,
            PostNode::Text(_) => &[],
        }
    }

    /// Element name for the tree builder. Only ever asked of elements.
    pub(crate) fn qual_name(&self, handle: NodeHandle) -> &QualName {
        match self.node(handle) {
            PostNode::Element(el) => &el.name,
            node => panic!("elem_name of a non-element node: {node:?}"),
        }
    }

    /// Concatenated text of a node's descendants.
    pub fn text_content(&self, handle: NodeHandle) -> String {
        let mut out = String::new();
        self.collect_text(handle, &mut out);
        out
    }

    fn collect_text(&self, handle: NodeHandle, out: &mut String) {
        match self.node(handle) {
            PostNode::Text(text) => out.push_str(&text.content),
            _ => {
                for &child in self.children(handle) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Whether the document contains nothing renderable (no non-whitespace
    /// text and no void elements like `<hr>` or `<img>`).
    pub fn is_empty(&self) -> bool {
        !self.has_renderable(self.document)
    }

    fn has_renderable(&self, handle: NodeHandle) -> bool {
        match self.node(handle) {
            PostNode::Text(text) => !text.content.trim().is_empty(),
            PostNode::Element(el) if matches!(el.tag(), "hr" | "img") => true,
            _ => self
                .children(handle)
                .iter()
                .any(|&child| self.has_renderable(child)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_dom_is_empty() {
        let dom = PostDom::new();
        assert!(dom.is_empty());
        assert!(dom.children(dom.document()).is_empty());
        assert_eq!(dom.text_content(dom.document()), "");
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let dom = parse("<p>Hello <strong>world</strong></p>").unwrap();
        assert_eq!(dom.text_content(dom.document()), "Hello world");
        assert!(!dom.is_empty());
    }

    #[test]
    fn whitespace_only_document_counts_as_empty() {
        let dom = parse("  \n ").unwrap();
        assert!(dom.is_empty());
    }

    #[test]
    fn a_lone_hr_is_renderable() {
        let dom = parse("<hr />").unwrap();
        assert!(!dom.is_empty());
    }
}
