//! The editing/command engine behind the editor surface.
//!
//! [`Composer`] owns the document being edited (a markdown text buffer, the
//! representation the `TextEdit` widget actually edits), the current
//! selection, and the undo/redo history. Toolbar commands are applied through
//! [`Composer::apply`]; button enablement and active-state styling come from
//! the pure queries [`Composer::can_apply`] and [`Composer::is_active`],
//! re-evaluated against current state on every frame.
//!
//! Inline marks are markdown delimiters (`**`, `*`, `~~`, `` ` ``); underline
//! has no markdown syntax and is carried as literal `<u>`/`</u>` tags, which
//! survive HTML serialization unchanged. Block commands rewrite the prefixes
//! of the lines covered by the selection.

use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::Regex;

use super::action::ComposerAction;
use super::html::markdown_to_html;

/// A whole-buffer history entry: document text plus selection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    text: String,
    selection: Range<usize>,
}

/// The rich-text composer model.
pub struct Composer {
    /// The markdown source of the document. Edited in place by the UI.
    pub text: String,
    /// Current selection as a byte range into `text` (start <= end).
    selection: Range<usize>,
    /// States to return to on undo.
    undo_stack: Vec<Snapshot>,
    /// States to return to on redo. Cleared by any new mutation.
    redo_stack: Vec<Snapshot>,
    /// Buffer state as of the last command boundary, used to coalesce
    /// free-form typing into a single undo entry.
    last_committed: Snapshot,
    /// Whether we are inside a typing burst.
    typing: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Create a new empty composer.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            selection: 0..0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_committed: Snapshot {
                text: String::new(),
                selection: 0..0,
            },
            typing: false,
        }
    }

    /// Create a composer pre-populated with markdown content, cursor at the
    /// end.
    pub fn from_markdown(markdown: &str) -> Self {
        let mut composer = Self::new();
        composer.text = markdown.to_string();
        let end = composer.text.len();
        composer.selection = end..end;
        composer.last_committed = composer.snapshot();
        composer
    }

    /// The current selection as a byte range.
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Whether the selection is a range rather than a collapsed cursor.
    pub fn has_selection(&self) -> bool {
        self.selection.start != self.selection.end
    }

    /// Set the selection as a byte range, clamped to the buffer.
    pub fn select(&mut self, start: usize, end: usize) {
        self.selection = start..end;
        self.clamp_selection();
    }

    /// Set the selection from `TextEdit` cursor positions (char indices,
    /// in either order).
    pub fn set_selection_chars(&mut self, a: usize, b: usize) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let start = byte_index(&self.text, lo);
        let end = byte_index(&self.text, hi);
        self.selection = start..end;
    }

    /// Record that the user edited the buffer directly (typing, paste,
    /// deletion). Consecutive edits between command boundaries coalesce into
    /// one undo entry.
    pub fn note_edit(&mut self) {
        if !self.typing {
            self.undo_stack.push(self.last_committed.clone());
            self.redo_stack.clear();
            self.typing = true;
        }
    }

    /// Serialize the current document to its HTML wire format.
    pub fn serialize_html(&self) -> String {
        markdown_to_html(&self.text)
    }

    /// Whether `action` is currently applicable.
    ///
    /// Undo and redo require history; inline marks and lists make no sense
    /// inside a fenced code block. Everything else is always applicable.
    pub fn can_apply(&self, action: ComposerAction) -> bool {
        match action {
            ComposerAction::Undo => !self.undo_stack.is_empty(),
            ComposerAction::Redo => !self.redo_stack.is_empty(),
            a if a.is_inline_mark() => !self.in_code_block(),
            ComposerAction::BulletList | ComposerAction::OrderedList => {
                !self.in_code_block()
            }
            _ => true,
        }
    }

    /// Whether the formatting `action` toggles is present at the current
    /// selection.
    pub fn is_active(&self, action: ComposerAction) -> bool {
        if let Some(level) = action.heading_level() {
            return self.heading_active(level);
        }
        match action {
            ComposerAction::Bold => self.star_mark_active("**"),
            ComposerAction::Italic => self.star_mark_active("*"),
            ComposerAction::Underline => self.surrounded("<u>", "</u>"),
            ComposerAction::StrikeThrough => self.surrounded("~~", "~~"),
            ComposerAction::InlineCode => self.surrounded("`", "`"),
            ComposerAction::Paragraph => self.paragraph_active(),
            ComposerAction::BulletList => self.list_active(bullet_prefix_len),
            ComposerAction::OrderedList => self.list_active(ordered_prefix_len),
            ComposerAction::Blockquote => self.list_active(quote_prefix_len),
            ComposerAction::CodeBlock => self.in_code_block(),
            _ => false,
        }
    }

    /// Apply a formatting command to the current selection. Inapplicable
    /// commands are a no-op.
    pub fn apply(&mut self, action: ComposerAction) {
        if !self.can_apply(action) {
            return;
        }
        match action {
            ComposerAction::Undo => return self.undo(),
            ComposerAction::Redo => return self.redo(),
            _ => {}
        }

        self.end_typing_burst();
        self.push_undo();

        if let Some(level) = action.heading_level() {
            self.toggle_heading(level);
        } else {
            match action {
                ComposerAction::Bold => self.toggle_star_mark("**"),
                ComposerAction::Italic => self.toggle_star_mark("*"),
                ComposerAction::Underline => self.toggle_surround("<u>", "</u>"),
                ComposerAction::StrikeThrough => self.toggle_surround("~~", "~~"),
                ComposerAction::InlineCode => self.toggle_surround("`", "`"),
                ComposerAction::ClearMarks => self.clear_marks(),
                ComposerAction::ClearNodes | ComposerAction::Paragraph => {
                    self.set_paragraph()
                }
                ComposerAction::BulletList => self.toggle_bullet_list(),
                ComposerAction::OrderedList => self.toggle_ordered_list(),
                ComposerAction::CodeBlock => self.toggle_code_block(),
                ComposerAction::Blockquote => self.toggle_blockquote(),
                ComposerAction::HorizontalRule => self.insert_rule(),
                ComposerAction::HardBreak => self.insert_break(),
                _ => unreachable!("heading, undo and redo handled above"),
            }
        }

        self.end_typing_burst();
    }

    // ----- history -------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Push the current state onto the undo stack and invalidate redo.
    fn push_undo(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
    }

    /// Mark a command boundary: subsequent typing starts a fresh undo entry.
    fn end_typing_burst(&mut self) {
        self.typing = false;
        self.last_committed = self.snapshot();
    }

    fn restore(&mut self, snap: Snapshot) {
        self.text = snap.text;
        self.selection = snap.selection;
        self.clamp_selection();
        self.last_committed = self.snapshot();
    }

    fn undo(&mut self) {
        self.typing = false;
        if let Some(snap) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(snap);
        }
    }

    fn redo(&mut self) {
        self.typing = false;
        if let Some(snap) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(snap);
        }
    }

    // ----- inline marks --------------------------------------------------

    /// Lengths of the `*` runs immediately surrounding the selection.
    /// Distinguishes bold (`**`) from italic (`*`) without confusing the two.
    fn star_runs(&self) -> (usize, usize) {
        let before = self.text[..self.selection.start]
            .bytes()
            .rev()
            .take_while(|b| *b == b'*')
            .count();
        let after = self.text[self.selection.end..]
            .bytes()
            .take_while(|b| *b == b'*')
            .count();
        (before, after)
    }

    /// Bold and italic open state at the selection start, found by pairing
    /// the star runs earlier on the line. A run that closes one span must
    /// not be read as the opener of the next, as in `**a**b**` with `b`
    /// selected.
    fn star_state_before(&self) -> (bool, bool) {
        let span = self.line_span();
        let mut bold = false;
        let mut italic = false;
        let mut run = 0usize;
        for byte in self.text[span.start..self.selection.start].bytes() {
            if byte == b'*' {
                run += 1;
                continue;
            }
            if run >= 2 {
                bold = !bold;
            }
            if run % 2 == 1 {
                italic = !italic;
            }
            run = 0;
        }
        if run >= 2 {
            bold = !bold;
        }
        if run % 2 == 1 {
            italic = !italic;
        }
        (bold, italic)
    }

    /// Whether the selection sits inside a span delimited by `marker`.
    /// Requires both a flanking run of the right width and an open state
    /// carried from the start of the line.
    fn star_mark_active(&self, marker: &str) -> bool {
        let (before, after) = self.star_runs();
        let flanked = if marker == "**" {
            before >= 2 && after >= 2
        } else {
            before % 2 == 1 && after % 2 == 1
        };
        if !flanked {
            return false;
        }
        let (bold, italic) = self.star_state_before();
        if marker == "**" {
            bold
        } else {
            italic
        }
    }

    fn surrounded(&self, open: &str, close: &str) -> bool {
        self.text[..self.selection.start].ends_with(open)
            && self.text[self.selection.end..].starts_with(close)
    }

    fn toggle_star_mark(&mut self, marker: &str) {
        let active = self.star_mark_active(marker);
        let Range { start, end } = self.selection.clone();
        let n = marker.len();
        if active {
            self.text.replace_range(end..end + n, "");
            self.text.replace_range(start - n..start, "");
            self.selection = start - n..end - n;
        } else {
            self.text.insert_str(end, marker);
            self.text.insert_str(start, marker);
            self.selection = start + n..end + n;
        }
    }

    fn toggle_surround(&mut self, open: &str, close: &str) {
        let Range { start, end } = self.selection.clone();
        if self.surrounded(open, close) {
            self.text.replace_range(end..end + close.len(), "");
            self.text.replace_range(start - open.len()..start, "");
            self.selection = start - open.len()..end - open.len();
        } else {
            self.text.insert_str(end, close);
            self.text.insert_str(start, open);
            self.selection = start + open.len()..end + open.len();
        }
    }

    /// Strip all inline mark delimiters from the selection (or the current
    /// line when the cursor is collapsed).
    fn clear_marks(&mut self) {
        let span = if self.has_selection() {
            self.selection.clone()
        } else {
            self.line_span()
        };
        let cleaned = self.text[span.clone()]
            .replace("<u>", "")
            .replace("</u>", "")
            .replace('*', "")
            .replace("~~", "")
            .replace('`', "");
        self.text.replace_range(span.clone(), &cleaned);
        self.selection = span.start..span.start + cleaned.len();
    }

    // ----- block commands ------------------------------------------------

    /// Byte range covering the full lines touched by the selection, without
    /// the trailing newline.
    fn line_span(&self) -> Range<usize> {
        let start = self.text[..self.selection.start]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let end = self.text[self.selection.end..]
            .find('\n')
            .map_or(self.text.len(), |i| self.selection.end + i);
        start..end
    }

    /// Rewrite every line covered by the selection and re-select the result.
    fn transform_lines(&mut self, mut f: impl FnMut(&str) -> String) {
        let span = self.line_span();
        let transformed: Vec<String> =
            self.text[span.clone()].split('\n').map(|l| f(l)).collect();
        let replacement = transformed.join("\n");
        self.text.replace_range(span.clone(), &replacement);
        self.selection = span.start..span.start + replacement.len();
    }

    fn toggle_heading(&mut self, level: u8) {
        let active = self.heading_active(level);
        let prefix = format!("{} ", "#".repeat(level as usize));
        self.transform_lines(|line| {
            let body = strip_heading(line);
            if active {
                body.to_string()
            } else {
                format!("{prefix}{body}")
            }
        });
    }

    fn heading_active(&self, level: u8) -> bool {
        let span = self.line_span();
        self.text[span]
            .split('\n')
            .all(|line| heading_level_of(line) == Some(level))
    }

    /// Convert the selected lines to plain paragraphs, removing heading,
    /// quote and list prefixes (and lifting out of a code block first).
    fn set_paragraph(&mut self) {
        if self.in_code_block() {
            self.toggle_code_block();
        }
        self.transform_lines(|line| strip_block_prefixes(line).to_string());
    }

    fn paragraph_active(&self) -> bool {
        if self.in_code_block() {
            return false;
        }
        let span = self.line_span();
        self.text[span]
            .split('\n')
            .all(|line| strip_block_prefixes(line).len() == line.len())
    }

    /// Whether every non-empty selected line carries the prefix recognized
    /// by `prefix_len`, with at least one non-empty line.
    fn list_active(&self, prefix_len: fn(&str) -> Option<usize>) -> bool {
        let span = self.line_span();
        let mut any = false;
        for line in self.text[span].split('\n') {
            if line.is_empty() {
                continue;
            }
            if prefix_len(line).is_none() {
                return false;
            }
            any = true;
        }
        any
    }

    fn toggle_bullet_list(&mut self) {
        let active = self.list_active(bullet_prefix_len);
        self.transform_lines(|line| {
            if line.is_empty() {
                return String::new();
            }
            let body = strip_list(line);
            if active {
                body.to_string()
            } else {
                format!("- {body}")
            }
        });
    }

    fn toggle_ordered_list(&mut self) {
        let active = self.list_active(ordered_prefix_len);
        let mut number = 0usize;
        self.transform_lines(|line| {
            if line.is_empty() {
                return String::new();
            }
            let body = strip_list(line);
            if active {
                body.to_string()
            } else {
                number += 1;
                format!("{number}. {body}")
            }
        });
    }

    fn toggle_blockquote(&mut self) {
        let active = self.list_active(quote_prefix_len);
        self.transform_lines(|line| {
            if line.is_empty() {
                return String::new();
            }
            let body = line.strip_prefix("> ").unwrap_or(line);
            if active {
                body.to_string()
            } else {
                format!("> {body}")
            }
        });
    }

    /// Byte ranges of every fence line (```` ``` ````), including the
    /// trailing newline where present.
    fn fence_line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut offset = 0;
        for line in self.text.split_inclusive('\n') {
            if line.trim().starts_with("```") {
                ranges.push(offset..offset + line.len());
            }
            offset += line.len();
        }
        ranges
    }

    /// Whether the selected lines sit inside a fenced code block.
    fn in_code_block(&self) -> bool {
        let span = self.line_span();
        self.fence_line_ranges()
            .iter()
            .filter(|r| r.end <= span.start)
            .count()
            % 2
            == 1
    }

    fn toggle_code_block(&mut self) {
        let span = self.line_span();
        if self.in_code_block() {
            let fences = self.fence_line_ranges();
            let open = fences.iter().filter(|r| r.end <= span.start).last().cloned();
            // The selection may sit on the closing fence line itself, so look
            // for the first fence past the opening one rather than past the
            // selection.
            let close = fences.iter().find(|r| r.end > span.start).cloned();
            // The closing fence comes later in the buffer; removing it first
            // keeps the opening fence's range valid.
            if let Some(close) = close {
                self.text.replace_range(close, "");
            }
            if let Some(open) = open {
                let removed = open.len();
                self.text.replace_range(open, "");
                self.selection = self.selection.start.saturating_sub(removed)
                    ..self.selection.end.saturating_sub(removed);
            }
            self.clamp_selection();
        } else {
            let inner = self.text[span.clone()].to_string();
            let fenced = format!("```\n{inner}\n```");
            self.text.replace_range(span.clone(), &fenced);
            self.selection = span.start + 4..span.start + 4 + inner.len();
        }
    }

    /// Insert a thematic break on its own paragraph after the selection.
    fn insert_rule(&mut self) {
        const RULE: &str = "\n\n---\n\n";
        let at = self.selection.end;
        self.text.insert_str(at, RULE);
        let caret = at + RULE.len();
        self.selection = caret..caret;
    }

    /// Replace the selection with a hard line break.
    fn insert_break(&mut self) {
        let span = self.selection.clone();
        self.text.replace_range(span.clone(), "\\\n");
        let caret = span.start + 2;
        self.selection = caret..caret;
    }

    fn clamp_selection(&mut self) {
        let len = self.text.len();
        let mut start = self.selection.start.min(len);
        let mut end = self.selection.end.min(len);
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        self.selection = start.min(end)..start.max(end);
    }
}

/// Byte offset of the `char_idx`-th character, or the buffer length.
fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices().nth(char_idx).map_or(text.len(), |(i, _)| i)
}

fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("literal regex"))
}

fn heading_level_of(line: &str) -> Option<u8> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if (1..=6).contains(&hashes) && line.as_bytes().get(hashes) == Some(&b' ') {
        Some(hashes as u8)
    } else {
        None
    }
}

fn strip_heading(line: &str) -> &str {
    heading_level_of(line).map_or(line, |level| &line[level as usize + 1..])
}

fn bullet_prefix_len(line: &str) -> Option<usize> {
    if line.starts_with("- ") || line.starts_with("* ") {
        Some(2)
    } else {
        None
    }
}

fn ordered_prefix_len(line: &str) -> Option<usize> {
    ordered_re().find(line).map(|m| m.end())
}

fn quote_prefix_len(line: &str) -> Option<usize> {
    line.starts_with("> ").then_some(2)
}

fn strip_list(line: &str) -> &str {
    match bullet_prefix_len(line).or_else(|| ordered_prefix_len(line)) {
        Some(n) => &line[n..],
        None => line,
    }
}

/// Repeatedly strip heading, quote and list prefixes until the line is bare.
fn strip_block_prefixes(line: &str) -> &str {
    let mut current = line;
    loop {
        let mut next = strip_heading(current);
        next = match quote_prefix_len(next) {
            Some(n) => &next[n..],
            None => next,
        };
        next = strip_list(next);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}
