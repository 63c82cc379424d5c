//! End-to-end composing flow: edit the buffer, apply toolbar actions,
//! save, and check the snapshot both as HTML text and through the
//! preview's DOM parser.

use draftpad::core::action::ComposerAction;
use draftpad::core::composer::Composer;
use draftpad::dom::{self, PostDom, PostNode};

fn parse(html: &str) -> PostDom {
    dom::parse(html).unwrap_or_else(|err| err.dom)
}

/// Collect (tag, text) pairs for the block-level children of a parsed
/// snapshot, descending through the fragment root element.
fn blocks(dom: &PostDom) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut roots = dom.children(dom.document()).to_vec();
    if let [root] = roots[..] {
        if let PostNode::Element(el) = dom.node(root) {
            if el.tag() == "html" {
                roots = dom.children(root).to_vec();
            }
        }
    }
    for handle in roots {
        if let PostNode::Element(el) = dom.node(handle) {
            out.push((el.tag().to_owned(), dom.text_content(handle)));
        }
    }
    out
}

#[test]
fn saving_an_untouched_composer_yields_the_empty_string() {
    let composer = Composer::new();
    assert_eq!(composer.serialize_html(), "");
    assert!(parse(&composer.serialize_html()).is_empty());
}

#[test]
fn bold_hello_saves_as_a_strong_paragraph() {
    let mut composer = Composer::from_markdown("Hello");
    composer.select(0, 5);
    composer.apply(ComposerAction::Bold);

    assert_eq!(composer.serialize_html(), "<p><strong>Hello</strong></p>");

    let dom = parse(&composer.serialize_html());
    assert_eq!(blocks(&dom), vec![("p".to_owned(), "Hello".to_owned())]);
}

#[test]
fn saving_twice_without_edits_is_idempotent() {
    let mut composer = Composer::from_markdown("Same words");
    composer.select(0, 4);
    composer.apply(ComposerAction::Italic);

    let first = composer.serialize_html();
    let second = composer.serialize_html();
    assert_eq!(first, second);
}

#[test]
fn snapshot_reflects_the_buffer_at_the_moment_of_save_only() {
    let mut composer = Composer::from_markdown("draft one");
    let saved = composer.serialize_html();
    assert_eq!(saved, "<p>draft one</p>");

    // Keep editing after the save. The captured snapshot must not move.
    composer.text.push_str(" and more");
    composer.note_edit();
    assert_eq!(saved, "<p>draft one</p>");
    assert_eq!(composer.serialize_html(), "<p>draft one and more</p>");
}

#[test]
fn heading_list_and_quote_survive_the_round_trip() {
    let mut composer = Composer::from_markdown("Title");
    composer.select(0, 5);
    composer.apply(ComposerAction::Heading2);

    composer.text.push_str("\nfirst\nsecond");
    composer.note_edit();
    let start = composer.text.len() - "first\nsecond".len();
    composer.select(start, composer.text.len());
    composer.apply(ComposerAction::BulletList);

    let dom = parse(&composer.serialize_html());
    let blocks = blocks(&dom);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].0, "h2");
    assert_eq!(blocks[0].1, "Title");
    assert_eq!(blocks[1].0, "ul");
    assert!(blocks[1].1.contains("first"));
    assert!(blocks[1].1.contains("second"));
}

#[test]
fn code_block_serializes_to_pre_code() {
    let mut composer = Composer::from_markdown("let x = 1;");
    composer.select(0, composer.text.len());
    composer.apply(ComposerAction::CodeBlock);

    let html = composer.serialize_html();
    assert!(html.starts_with("<pre><code>"), "got: {html}");
    assert!(html.contains("let x = 1;"));

    let dom = parse(&html);
    assert_eq!(blocks(&dom)[0].0, "pre");
}

#[test]
fn undo_restores_the_snapshot_that_a_new_save_would_capture() {
    let mut composer = Composer::from_markdown("Hello");
    composer.select(0, 5);
    composer.apply(ComposerAction::Bold);
    assert_eq!(composer.serialize_html(), "<p><strong>Hello</strong></p>");

    composer.apply(ComposerAction::Undo);
    assert_eq!(composer.serialize_html(), "<p>Hello</p>");

    composer.apply(ComposerAction::Redo);
    assert_eq!(composer.serialize_html(), "<p><strong>Hello</strong></p>");
}

#[test]
fn disabled_actions_leave_the_buffer_alone() {
    let mut composer = Composer::new();
    assert!(!composer.can_apply(ComposerAction::Undo));
    assert!(!composer.can_apply(ComposerAction::Redo));

    composer.apply(ComposerAction::Undo);
    composer.apply(ComposerAction::Redo);
    assert_eq!(composer.text, "");
    assert_eq!(composer.serialize_html(), "");
}

#[test]
fn hard_break_renders_as_br_inside_the_paragraph() {
    let mut composer = Composer::from_markdown("one two");
    composer.select(3, 4);
    composer.apply(ComposerAction::HardBreak);

    let html = composer.serialize_html();
    assert!(html.contains("<br />"), "got: {html}");

    let dom = parse(&html);
    let roots = dom.children(dom.document()).to_vec();
    assert!(!dom.is_empty());
    assert!(!roots.is_empty());
}

#[test]
fn underline_passes_through_serialization_untouched() {
    let mut composer = Composer::from_markdown("plain marked plain");
    composer.select(6, 12);
    composer.apply(ComposerAction::Underline);

    assert_eq!(
        composer.serialize_html(),
        "<p>plain <u>marked</u> plain</p>"
    );
}
