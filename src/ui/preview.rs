//! Saved-post preview panel
//!
//! Renders the HTML snapshot captured by the last save. The HTML is parsed
//! into a [`PostDom`] (cached until the snapshot changes) and walked into
//! egui widgets; elements the walker does not know degrade to plain inline
//! text. An empty snapshot renders an empty container.

use eframe::egui::{self, Color32, CornerRadius, FontId, RichText, Stroke, Ui};

use crate::dom::{self, NodeHandle, PostDom, PostNode};

/// Preview panel for the last saved post
pub struct PreviewPanel {
    cached_html: String,
    dom: PostDom,
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self {
            cached_html: String::new(),
            dom: PostDom::new(),
        }
    }

    /// Show the preview for `html`, re-parsing only when it changed.
    pub fn show(&mut self, ui: &mut Ui, html: &str) {
        if html != self.cached_html {
            self.dom = dom::parse(html).unwrap_or_else(|err| {
                tracing::warn!("saved HTML produced parse errors: {err}");
                err.dom
            });
            self.cached_html = html.to_owned();
        }

        egui::Frame::new()
            .fill(Color32::from_gray(34))
            .inner_margin(egui::Margin::same(12))
            .outer_margin(egui::Margin::symmetric(0, 8))
            .corner_radius(CornerRadius::same(4))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                if !self.dom.is_empty() {
                    render_children(ui, &self.dom, self.dom.document());
                }
            });
    }
}

/// Inline formatting accumulated while walking into an element.
#[derive(Debug, Clone, Default)]
struct InlineStyle {
    strong: bool,
    em: bool,
    underline: bool,
    strike: bool,
    code: bool,
    link: Option<String>,
}

/// A flattened piece of inline content.
#[derive(Debug, Clone)]
enum Span {
    Text { text: String, style: InlineStyle },
    Break,
}

fn render_children(ui: &mut Ui, dom: &PostDom, handle: NodeHandle) {
    for &child in dom.children(handle) {
        render_node(ui, dom, child);
    }
}

fn render_node(ui: &mut Ui, dom: &PostDom, handle: NodeHandle) {
    match dom.node(handle) {
        PostNode::Document(_) => render_children(ui, dom, handle),
        PostNode::Text(text) => {
            if !text.content.trim().is_empty() {
                let spans = vec![Span::Text {
                    text: text.content.clone(),
                    style: InlineStyle::default(),
                }];
                render_spans(ui, &spans, 14.0);
            }
        }
        PostNode::Element(el) => match el.tag() {
            // The fragment parser wraps content in a root <html> element.
            "html" | "body" | "div" => render_children(ui, dom, handle),
            "p" => render_paragraph(ui, dom, handle),
            "h1" => render_heading(ui, dom, handle, 1),
            "h2" => render_heading(ui, dom, handle, 2),
            "h3" => render_heading(ui, dom, handle, 3),
            "h4" => render_heading(ui, dom, handle, 4),
            "h5" => render_heading(ui, dom, handle, 5),
            "h6" => render_heading(ui, dom, handle, 6),
            "ul" => render_list(ui, dom, handle, false),
            "ol" => render_list(ui, dom, handle, true),
            "blockquote" => render_blockquote(ui, dom, handle),
            "pre" => render_code_block(ui, dom, handle),
            "hr" => render_horizontal_rule(ui),
            _ => render_paragraph(ui, dom, handle),
        },
    }
}

fn collect_spans(dom: &PostDom, handle: NodeHandle, style: &InlineStyle, out: &mut Vec<Span>) {
    match dom.node(handle) {
        PostNode::Text(text) => {
            let text = text.content.replace('\n', " ");
            if !text.trim().is_empty() {
                out.push(Span::Text {
                    text,
                    style: style.clone(),
                });
            }
        }
        PostNode::Element(el) => {
            let mut style = style.clone();
            match el.tag() {
                "strong" | "b" => style.strong = true,
                "em" | "i" => style.em = true,
                "u" => style.underline = true,
                "del" | "s" | "strike" => style.strike = true,
                "code" => style.code = true,
                "a" => style.link = el.get_attr("href").map(str::to_owned),
                "br" => {
                    out.push(Span::Break);
                    return;
                }
                _ => {}
            }
            for &child in dom.children(handle) {
                collect_spans(dom, child, &style, out);
            }
        }
        PostNode::Document(_) => {
            for &child in dom.children(handle) {
                collect_spans(dom, child, style, out);
            }
        }
    }
}

/// Emit one inline span as a label or hyperlink. Breaks are handled by the
/// callers and skipped here.
fn show_span(ui: &mut Ui, span: &Span, font_size: f32) {
    let Span::Text { text, style } = span else {
        return;
    };
    let mut rich = if style.code {
        RichText::new(text)
            .font(FontId::monospace(font_size * 0.9))
            .background_color(Color32::from_rgb(45, 45, 45))
    } else {
        RichText::new(text).font(FontId::proportional(font_size))
    };
    if style.strong {
        rich = rich.strong();
    }
    if style.em {
        rich = rich.italics();
    }
    if style.underline {
        rich = rich.underline();
    }
    if style.strike {
        rich = rich.strikethrough();
    }
    match &style.link {
        Some(url) => {
            ui.hyperlink_to(rich, url);
        }
        None => {
            ui.label(rich);
        }
    }
}

fn render_spans(ui: &mut Ui, spans: &[Span], font_size: f32) {
    for line in spans.split(|span| matches!(span, Span::Break)) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for span in line {
                show_span(ui, span, font_size);
            }
        });
    }
}

fn block_spans(dom: &PostDom, handle: NodeHandle, style: &InlineStyle) -> Vec<Span> {
    let mut spans = Vec::new();
    for &child in dom.children(handle) {
        collect_spans(dom, child, style, &mut spans);
    }
    spans
}

fn render_paragraph(ui: &mut Ui, dom: &PostDom, handle: NodeHandle) {
    let spans = block_spans(dom, handle, &InlineStyle::default());
    render_spans(ui, &spans, 14.0);
    ui.add_space(8.0);
}

fn render_heading(ui: &mut Ui, dom: &PostDom, handle: NodeHandle, level: u8) {
    let font_size = match level {
        1 => 28.0,
        2 => 24.0,
        3 => 20.0,
        4 => 18.0,
        5 => 16.0,
        _ => 14.0,
    };
    let style = InlineStyle {
        strong: true,
        ..InlineStyle::default()
    };
    let spans = block_spans(dom, handle, &style);
    render_spans(ui, &spans, font_size);
    ui.add_space(match level {
        1 => 12.0,
        2 => 10.0,
        _ => 6.0,
    });
}

fn render_list(ui: &mut Ui, dom: &PostDom, handle: NodeHandle, ordered: bool) {
    let mut number = match dom.node(handle) {
        PostNode::Element(el) => el
            .get_attr("start")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1)
            .saturating_sub(1),
        _ => 0,
    };

    for &child in dom.children(handle) {
        let PostNode::Element(li) = dom.node(child) else {
            continue;
        };
        if li.tag() != "li" {
            continue;
        }
        number += 1;

        // Inline content renders on the marker row; nested lists indent
        // below it.
        let mut nested = Vec::new();
        let mut spans = Vec::new();
        for &item_child in dom.children(child) {
            match dom.node(item_child) {
                PostNode::Element(el) if matches!(el.tag(), "ul" | "ol") => {
                    nested.push(item_child);
                }
                _ => collect_spans(dom, item_child, &InlineStyle::default(), &mut spans),
            }
        }

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            let marker = if ordered {
                format!("{number}. ")
            } else {
                "• ".to_string()
            };
            ui.label(RichText::new(marker).color(Color32::from_rgb(150, 150, 150)));
            for span in &spans {
                show_span(ui, span, 14.0);
            }
        });

        for nested_list in nested {
            ui.indent(("nested_list", nested_list), |ui| {
                render_node(ui, dom, nested_list);
            });
        }
    }
    ui.add_space(8.0);
}

fn render_blockquote(ui: &mut Ui, dom: &PostDom, handle: NodeHandle) {
    egui::Frame::new()
        .fill(Color32::from_gray(42))
        .inner_margin(egui::Margin::symmetric(12, 6))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .show(ui, |ui| {
            render_children(ui, dom, handle);
        });
}

fn render_code_block(ui: &mut Ui, dom: &PostDom, handle: NodeHandle) {
    let code = dom.text_content(handle);
    let code = code.trim_end_matches('\n');

    egui::Frame::new()
        .fill(Color32::from_rgb(40, 40, 40))
        .stroke(Stroke::new(1.0, Color32::from_rgb(60, 60, 60)))
        .inner_margin(egui::Margin::same(8))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .corner_radius(CornerRadius::same(4))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(
                RichText::new(code)
                    .font(FontId::monospace(13.0))
                    .color(Color32::from_rgb(220, 220, 220)),
            );
        });
    ui.add_space(8.0);
}

fn render_horizontal_rule(ui: &mut Ui) {
    ui.add_space(4.0);
    ui.separator();
    ui.add_space(4.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn styled(spans: &[Span]) -> Vec<(String, InlineStyle)> {
        spans
            .iter()
            .filter_map(|span| match span {
                Span::Text { text, style } => Some((text.clone(), style.clone())),
                Span::Break => None,
            })
            .collect()
    }

    #[test]
    fn list_item_spans_keep_underline_strike_and_link_styles() {
        let html =
            "<ul><li><u>x</u> <del>y</del> <a href=\"https://example.com\">z</a></li></ul>";
        let dom = dom::parse(html).unwrap_or_else(|err| err.dom);
        let root = dom.children(dom.document())[0];
        let ul = dom.children(root)[0];
        let li = dom.children(ul)[0];

        let spans = styled(&block_spans(&dom, li, &InlineStyle::default()));
        assert!(spans.iter().any(|(t, s)| t == "x" && s.underline));
        assert!(spans.iter().any(|(t, s)| t == "y" && s.strike));
        assert!(spans
            .iter()
            .any(|(t, s)| t == "z" && s.link.as_deref() == Some("https://example.com")));
    }
}
