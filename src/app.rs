use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AvanceDashApp {
    pub state: AppState,
}

impl AvanceDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for AvanceDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Cache-checked load for the active page; a no-op within the TTL.
        self.state.ensure_loaded();

        // ---- Top panel: menu bar and page switcher ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(230.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self.state.active_page_mut());
            });

        // ---- Central panel: KPIs, ranking, group summary ----
        egui::CentralPanel::default().show(ctx, |ui| {
            views::dashboard(ui, self.state.active_page());
        });
    }
}
