//! Markdown to HTML serialization
//!
//! The composer's document is a markdown buffer; a save serializes it to the
//! HTML wire format via pulldown-cmark. Underline has no markdown syntax and
//! travels as inline `<u>` tags, which pulldown-cmark passes through
//! untouched.

use pulldown_cmark::{html, Options, Parser};

/// Serialize a markdown document to an HTML string.
///
/// An empty (or whitespace-only) document serializes to the empty string, so
/// "save with no edits" and "no save yet" are indistinguishable downstream.
pub fn markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_serializes_to_empty_string() {
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("   \n\n  "), "");
    }

    #[test]
    fn plain_text_becomes_a_paragraph() {
        assert_eq!(markdown_to_html("Hello"), "<p>Hello</p>");
    }

    #[test]
    fn bold_text_produces_strong_tags() {
        assert_eq!(markdown_to_html("**Hello**"), "<p><strong>Hello</strong></p>");
    }

    #[test]
    fn italic_text_produces_em_tags() {
        assert_eq!(markdown_to_html("*Hello*"), "<p><em>Hello</em></p>");
    }

    #[test]
    fn strikethrough_produces_del_tags() {
        assert_eq!(markdown_to_html("~~gone~~"), "<p><del>gone</del></p>");
    }

    #[test]
    fn underline_tags_pass_through() {
        assert_eq!(markdown_to_html("<u>under</u>"), "<p><u>under</u></p>");
    }

    #[test]
    fn headings_produce_heading_tags() {
        assert_eq!(markdown_to_html("## Title"), "<h2>Title</h2>");
    }

    #[test]
    fn bullet_list_produces_ul() {
        assert_eq!(
            markdown_to_html("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>"
        );
    }

    #[test]
    fn fenced_code_produces_pre_code() {
        assert_eq!(
            markdown_to_html("```\nlet x = 1;\n```"),
            "<pre><code>let x = 1;\n</code></pre>"
        );
    }

    #[test]
    fn hard_break_produces_br() {
        assert_eq!(markdown_to_html("a\\\nb"), "<p>a<br />\nb</p>");
    }

    #[test]
    fn serialization_is_deterministic() {
        let md = "# Post\n\nSome **bold** text.";
        assert_eq!(markdown_to_html(md), markdown_to_html(md));
    }
}
