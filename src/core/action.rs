//! Toolbar action vocabulary
//!
//! Every toolbar control maps 1:1 to a [`ComposerAction`]. The variant order
//! is the toolbar order, so the UI can iterate the enum instead of
//! special-casing buttons.

use strum_macros::EnumIter;

/// A formatting command that can be applied to the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ComposerAction {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    InlineCode,
    ClearMarks,
    ClearNodes,
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    BulletList,
    OrderedList,
    CodeBlock,
    Blockquote,
    HorizontalRule,
    HardBreak,
    Undo,
    Redo,
}

impl ComposerAction {
    /// Toolbar caption for this action.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Underline => "U",
            Self::StrikeThrough => "Strike",
            Self::InlineCode => "Code",
            Self::ClearMarks => "Clear marks",
            Self::ClearNodes => "Clear nodes",
            Self::Paragraph => "Paragraph",
            Self::Heading1 => "H1",
            Self::Heading2 => "H2",
            Self::Heading3 => "H3",
            Self::Heading4 => "H4",
            Self::Heading5 => "H5",
            Self::Heading6 => "H6",
            Self::BulletList => "bl",
            Self::OrderedList => "ol",
            Self::CodeBlock => "Code block",
            Self::Blockquote => "Blockquote",
            Self::HorizontalRule => "Horizontal rule",
            Self::HardBreak => "Hard break",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
        }
    }

    /// Heading level for the heading actions, `None` otherwise.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            Self::Heading4 => Some(4),
            Self::Heading5 => Some(5),
            Self::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Whether this action toggles an inline mark on the selection.
    pub fn is_inline_mark(&self) -> bool {
        matches!(
            self,
            Self::Bold
                | Self::Italic
                | Self::Underline
                | Self::StrikeThrough
                | Self::InlineCode
        )
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn toolbar_order_starts_with_marks_and_ends_with_history() {
        let all: Vec<ComposerAction> = ComposerAction::iter().collect();
        assert_eq!(all.first(), Some(&ComposerAction::Bold));
        assert_eq!(all.last(), Some(&ComposerAction::Redo));
        assert_eq!(all.len(), 22);
    }

    #[test]
    fn heading_levels_cover_one_to_six() {
        let levels: Vec<u8> = ComposerAction::iter()
            .filter_map(|a| a.heading_level())
            .collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn inline_marks_are_exactly_the_five_mark_actions() {
        let marks: Vec<ComposerAction> = ComposerAction::iter()
            .filter(ComposerAction::is_inline_mark)
            .collect();
        assert_eq!(
            marks,
            vec![
                ComposerAction::Bold,
                ComposerAction::Italic,
                ComposerAction::Underline,
                ComposerAction::StrikeThrough,
                ComposerAction::InlineCode,
            ]
        );
    }
}
