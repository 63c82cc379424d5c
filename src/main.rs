//! Draftpad - rich-text post composer with live save preview

use draftpad::app::DraftpadApp;
use eframe::egui;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Draftpad...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([600.0, 480.0])
            .with_title("Draftpad"),
        ..Default::default()
    };

    eframe::run_native(
        "Draftpad",
        native_options,
        Box::new(|cc| Ok(Box::new(DraftpadApp::new(cc)))),
    )
}
