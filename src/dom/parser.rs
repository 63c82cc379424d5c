//! Saved-HTML fragment parsing
//!
//! Builds a [`PostDom`] from an HTML string by feeding html5ever's fragment
//! parser into a [`TreeSink`] over the arena. Recoverable parse errors are
//! collected rather than aborting; callers that want best-effort rendering
//! can take the partial DOM out of [`DomCreationError`].

use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{namespace_url, ns, parse_fragment, Attribute, LocalName, QualName};
use thiserror::Error;

use super::{ElementNode, NodeHandle, PostDom, PostNode, TextNode};

/// Parse failure carrying the partial DOM built so far.
#[derive(Debug, Clone, Error)]
#[error("failed to parse saved HTML: {}", parse_errors.join("; "))]
pub struct DomCreationError {
    pub dom: PostDom,
    pub parse_errors: Vec<String>,
}

/// Parse an HTML fragment into a [`PostDom`].
///
/// The empty string parses to an empty document.
pub fn parse(html: &str) -> Result<PostDom, DomCreationError> {
    parse_fragment(
        DomBuilder::default(),
        Default::default(),
        fragment_context(),
        vec![],
    )
    .from_utf8()
    .one(html.as_bytes())
}

fn fragment_context() -> QualName {
    QualName::new(None, ns!(html), LocalName::from(""))
}

#[derive(Default)]
struct BuilderState {
    dom: PostDom,
    parse_errors: Vec<String>,
}

struct DomBuilder {
    state: RefCell<BuilderState>,
}

impl Default for DomBuilder {
    fn default() -> Self {
        Self {
            state: RefCell::new(BuilderState::default()),
        }
    }
}

impl TreeSink for DomBuilder {
    type Handle = NodeHandle;
    type Output = Result<PostDom, DomCreationError>;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        let state = self.state.into_inner();
        if state.parse_errors.is_empty() {
            Ok(state.dom)
        } else {
            Err(DomCreationError {
                dom: state.dom,
                parse_errors: state.parse_errors,
            })
        }
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        self.state.borrow_mut().parse_errors.push(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().dom.document()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |state| state.dom.qual_name(*target))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .iter()
            .map(|attr| {
                (
                    attr.name.local.as_ref().to_owned(),
                    attr.value.as_ref().to_owned(),
                )
            })
            .collect();
        self.state
            .borrow_mut()
            .dom
            .add_node(PostNode::Element(ElementNode {
                name,
                attrs,
                children: Vec::new(),
            }))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        // Comments are kept as empty text so they render as nothing.
        self.state
            .borrow_mut()
            .dom
            .add_node(PostNode::Text(TextNode {
                content: String::new(),
            }))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.state
            .borrow_mut()
            .dom
            .add_node(PostNode::Text(TextNode {
                content: String::new(),
            }))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let dom = &mut self.state.borrow_mut().dom;
        match child {
            NodeOrText::AppendNode(child) => match dom.node_mut(*parent) {
                PostNode::Element(p) => p.children.push(child),
                PostNode::Document(p) => p.children.push(child),
                PostNode::Text(_) => {
                    panic!("appending node to a text node: {parent:?}")
                }
            },
            NodeOrText::AppendText(tendril) => {
                // Merge with a trailing text child if there is one.
                let text_handle = match dom.node(*parent) {
                    PostNode::Text(_) => Some(*parent),
                    _ => match dom.children(*parent).last().copied() {
                        Some(last) if matches!(dom.node(last), PostNode::Text(_)) => {
                            Some(last)
                        }
                        _ => None,
                    },
                };

                if let Some(text_handle) = text_handle {
                    if let PostNode::Text(t) = dom.node_mut(text_handle) {
                        t.content += tendril.as_ref();
                    } else {
                        unreachable!("`text_handle` must map to a text node")
                    }
                } else {
                    let new_handle = dom.add_node(PostNode::Text(TextNode {
                        content: tendril.as_ref().to_owned(),
                    }));
                    match dom.node_mut(*parent) {
                        PostNode::Element(p) => p.children.push(new_handle),
                        PostNode::Document(p) => p.children.push(new_handle),
                        PostNode::Text(_) => {
                            panic!("parent changed from container to text")
                        }
                    }
                }
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        _prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        // No templates in saved posts; treat as a plain append.
        self.append(element, child)
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Fragments carry no doctype worth keeping.
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        _sibling: &Self::Handle,
        _new_node: NodeOrText<Self::Handle>,
    ) {
        // Only reached via foster parenting, which saved posts never trigger.
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let dom = &mut self.state.borrow_mut().dom;
        if let PostNode::Element(el) = dom.node_mut(*target) {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if !el.attrs.iter().any(|(n, _)| n == name) {
                    el.attrs
                        .push((name.to_owned(), attr.value.as_ref().to_owned()));
                }
            }
        } else {
            panic!("non-element passed to add_attrs_if_missing");
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {}

    fn reparent_children(&self, _node: &Self::Handle, _new_parent: &Self::Handle) {}

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(&self, _intended_parent: &Self::Handle) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Err(String::from("declarative shadow roots are not supported"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_lenient(html: &str) -> PostDom {
        parse(html).unwrap_or_else(|err| err.dom)
    }

    /// The fragment parser wraps content in a root `html` element; tests
    /// (and the preview) care about what's inside it.
    fn fragment_children(dom: &PostDom) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        for &child in dom.children(dom.document()) {
            match dom.node(child) {
                PostNode::Element(el) if el.tag() == "html" => {
                    out.extend(dom.children(child).iter().copied());
                }
                _ => out.push(child),
            }
        }
        out
    }

    fn expect_element<'a>(dom: &'a PostDom, handle: NodeHandle, tag: &str) -> &'a ElementNode {
        match dom.node(handle) {
            PostNode::Element(el) if el.tag() == tag => el,
            node => panic!("expected <{tag}>, got {node:?}"),
        }
    }

    #[test]
    fn empty_string_parses_to_an_empty_fragment() {
        let dom = parse_lenient("");
        assert!(fragment_children(&dom).is_empty());
        assert!(dom.is_empty());
    }

    #[test]
    fn bare_text_parses_to_a_text_node() {
        let dom = parse_lenient("foo");
        let children = fragment_children(&dom);
        assert_eq!(children.len(), 1);
        match dom.node(children[0]) {
            PostNode::Text(t) => assert_eq!(t.content, "foo"),
            node => panic!("expected text, got {node:?}"),
        }
    }

    #[test]
    fn a_bold_paragraph_parses_to_nested_elements() {
        let dom = parse_lenient("<p><strong>Hello</strong></p>");
        let children = fragment_children(&dom);
        assert_eq!(children.len(), 1);
        let p = expect_element(&dom, children[0], "p");
        let strong = expect_element(&dom, p.children[0], "strong");
        assert_eq!(dom.text_content(strong.children[0]), "Hello");
    }

    #[test]
    fn adjacent_text_runs_are_merged() {
        let dom = parse_lenient("a<i>b</i>c");
        let children = fragment_children(&dom);
        // text, <i>, text
        assert_eq!(children.len(), 3);
        assert_eq!(dom.text_content(children[2]), "c");
    }

    #[test]
    fn attributes_are_preserved() {
        let dom = parse_lenient(r#"<a href="https://example.com">link</a>"#);
        let children = fragment_children(&dom);
        let a = expect_element(&dom, children[0], "a");
        assert_eq!(a.get_attr("href"), Some("https://example.com"));
    }

    #[test]
    fn escaped_entities_become_plain_text() {
        let dom = parse_lenient("a &lt;strong&gt;b&lt;/strong&gt; c");
        assert_eq!(dom.text_content(dom.document()), "a <strong>b</strong> c");
        let children = fragment_children(&dom);
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn unclosed_tags_are_tolerated() {
        let dom = parse_lenient("<p>open");
        let children = fragment_children(&dom);
        let p = expect_element(&dom, children[0], "p");
        assert_eq!(dom.text_content(p.children[0]), "open");
    }
}
