use avance_dash::app::AvanceDashApp;
use avance_dash::{config, state::AppState};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let data_dir = config::data_dir();
    let pages = config::load_pages(&data_dir);
    log::info!(
        "Data directory {} with {} page(s)",
        data_dir.display(),
        pages.len()
    );
    let state = AppState::new(pages, data_dir);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard Avance y Ranking",
        options,
        Box::new(move |_cc| Ok(Box::new(AvanceDashApp::new(state)))),
    )
}
