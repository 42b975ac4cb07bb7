mod app;
mod canvas;
pub mod interaction;
mod panels;

use eframe::egui;

use crate::config::AppConfig;

use app::ExplorerApp;

const WINDOW_SIZE: [f32; 2] = [1280.0, 820.0];
const WINDOW_MIN_SIZE: [f32; 2] = [800.0, 560.0];

/// Starts the explorer with default configuration and GUI logging.
pub fn run(initial: Option<String>) -> Result<(), String> {
    crate::logging::init("info");
    run_with_config(initial, AppConfig::default())
}

/// Starts the explorer. `initial` is a file path or URL to open instead of the placeholder.
pub fn run_with_config(initial: Option<String>, config: AppConfig) -> Result<(), String> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Slide Explorer")
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_MIN_SIZE)
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Slide Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, config, initial)))),
    )
    .map_err(|error| error.to_string())
}
