//! Main application state and UI coordination

use eframe::egui;

use crate::core::composer::Composer;
use crate::core::config::AppConfig;
use crate::ui::editor::EditorPanel;
use crate::ui::preview::PreviewPanel;

/// Main application state
pub struct DraftpadApp {
    /// The composing engine. Nothing is drawn until it exists.
    composer: Option<Composer>,
    /// HTML snapshot captured by the most recent explicit save.
    current_html: String,
    /// Application configuration
    config: AppConfig,
    editor: EditorPanel,
    preview: PreviewPanel,
}

impl DraftpadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load().unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {err:#}");
            AppConfig::default()
        });

        Self {
            composer: Some(Composer::new()),
            current_html: String::new(),
            config,
            editor: EditorPanel::new(),
            preview: PreviewPanel::new(),
        }
    }

    fn save_snapshot(&mut self) {
        if let Some(composer) = &self.composer {
            self.current_html = composer.serialize_html();
        }
    }

    fn persist_config(&self) {
        if let Err(err) = self.config.save() {
            tracing::warn!("Failed to save config: {err:#}");
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Post", |ui| {
                    if ui.button("Save").clicked() {
                        self.save_snapshot();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui
                        .checkbox(&mut self.config.ui.show_preview, "Show preview")
                        .changed()
                    {
                        self.persist_config();
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for DraftpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.save_snapshot();
        }

        self.render_menu_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("page_scroll")
                .show(ui, |ui| {
                    let Some(composer) = &mut self.composer else {
                        return;
                    };
                    if let Some(html) = self.editor.show(ui, composer, &self.config.editor) {
                        self.current_html = html;
                    }
                    if self.config.ui.show_preview {
                        ui.add_space(12.0);
                        ui.separator();
                        ui.label(
                            egui::RichText::new("Preview")
                                .color(egui::Color32::from_gray(140))
                                .small(),
                        );
                        self.preview.show(ui, &self.current_html);
                    }
                });
        });
    }
}
