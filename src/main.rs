mod app;
mod color;
mod state;
mod ui;

use app::GradationApp;
use eframe::egui;
use gradation::settings::Settings;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let settings_path = Settings::default_path();
    let settings = Settings::load_or_default(&settings_path);
    log::info!(
        "starting with material {} and total weight {}",
        settings.material.key(),
        settings.total_weight
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 780.0])
            .with_min_inner_size([1000.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gradation Analysis",
        options,
        Box::new(move |_cc| {
            let state = AppState::new(settings, Some(settings_path));
            Ok(Box::new(GradationApp::new(state)))
        }),
    )
}
