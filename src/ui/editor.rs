//! Editor surface: formatting toolbar, editable text region and save button
//!
//! Every toolbar control maps to one [`ComposerAction`]; enabled and pressed
//! states come straight from the composer's `can_apply` and `is_active`
//! queries so the toolbar never keeps state of its own.

use eframe::egui::{self, Color32, FontId, RichText, Stroke, Ui};
use strum::IntoEnumIterator;

use crate::core::action::ComposerAction;
use crate::core::composer::Composer;
use crate::core::config::EditorConfig;

/// Editor panel wrapping the composer in a toolbar and text area
pub struct EditorPanel {
    /// Set when a toolbar click steals focus from the text area.
    refocus: bool,
}

impl Default for EditorPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPanel {
    pub fn new() -> Self {
        Self { refocus: false }
    }

    /// Render the editor. Returns the serialized HTML when Save was clicked.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        composer: &mut Composer,
        config: &EditorConfig,
    ) -> Option<String> {
        let mut saved = None;

        self.show_toolbar(ui, composer);
        ui.add_space(6.0);
        self.show_text_area(ui, composer, config);
        ui.add_space(8.0);

        if ui.button(RichText::new("Save").strong()).clicked() {
            let html = composer.serialize_html();
            tracing::debug!(bytes = html.len(), "captured post snapshot");
            saved = Some(html);
        }

        saved
    }

    fn show_toolbar(&mut self, ui: &mut Ui, composer: &mut Composer) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            for action in ComposerAction::iter() {
                let enabled = composer.can_apply(action);
                let button =
                    egui::Button::new(Self::caption(action)).selected(composer.is_active(action));
                if ui.add_enabled(enabled, button).clicked() {
                    composer.apply(action);
                    self.refocus = true;
                }
            }
        });
    }

    fn show_text_area(&mut self, ui: &mut Ui, composer: &mut Composer, config: &EditorConfig) {
        egui::Frame::new()
            .stroke(Stroke::new(1.0, Color32::from_gray(60)))
            .inner_margin(egui::Margin::same(4))
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("editor_scroll")
                    .max_height(360.0)
                    .show(ui, |ui| {
                        let output = egui::TextEdit::multiline(&mut composer.text)
                            .font(FontId::proportional(config.font_size))
                            .desired_width(f32::INFINITY)
                            .desired_rows(config.desired_rows)
                            .hint_text("Write your post...")
                            .show(ui);

                        if output.response.changed() {
                            composer.note_edit();
                        }
                        if let Some(range) = output.state.cursor.char_range() {
                            composer
                                .set_selection_chars(range.primary.index, range.secondary.index);
                        }
                        if self.refocus {
                            output.response.request_focus();
                            self.refocus = false;
                        }
                    });
            });
    }

    fn caption(action: ComposerAction) -> RichText {
        let text = RichText::new(action.label());
        match action {
            ComposerAction::Bold => text.strong(),
            ComposerAction::Italic => text.italics(),
            ComposerAction::Underline => text.underline(),
            ComposerAction::StrikeThrough => text.strikethrough(),
            ComposerAction::InlineCode | ComposerAction::CodeBlock => {
                text.font(FontId::monospace(12.0))
            }
            _ => text,
        }
    }
}
