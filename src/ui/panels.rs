use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::aggregate::{TOP_N_MAX, TOP_N_MIN};
use crate::data::filter::{filter_options, Choice, ALL_VALUES};
use crate::state::{AppState, PageState};
use crate::ui::views::column_label;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel for the active page.
pub fn side_panel(ui: &mut Ui, page: &mut PageState) {
    ui.heading("Filtros");
    ui.separator();

    let Some(table) = page.table.clone() else {
        ui.label("Sin datos cargados.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- One single-select per grouping column ----
            for (i, col) in table.schema.group_columns.iter().enumerate() {
                ui.strong(column_label(col));
                let options = filter_options(&table, i);
                let current = page.selection.groups[i].to_string();
                egui::ComboBox::from_id_salt(col.as_str())
                    .selected_text(&current)
                    .width(ui.available_width() * 0.9)
                    .show_ui(ui, |ui: &mut Ui| {
                        for opt in &options {
                            let is_selected = current == *opt;
                            if ui.selectable_label(is_selected, opt).clicked() && !is_selected {
                                page.selection.groups[i] = if opt == ALL_VALUES {
                                    Choice::Todos
                                } else {
                                    Choice::Value(opt.clone())
                                };
                                changed = true;
                            }
                        }
                    });
                ui.add_space(8.0);
            }

            // ---- Winners-only toggle ----
            if ui
                .checkbox(&mut page.selection.winners_only, "Mostrar solo ganadores")
                .changed()
            {
                changed = true;
            }
            ui.add_space(8.0);

            // ---- Top-N slider ----
            ui.strong("Top Ranking");
            ui.add(Slider::new(&mut page.top_n, TOP_N_MIN..=TOP_N_MAX));
        });

    if changed {
        page.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar: file actions, page switcher, status.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir datos…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Recargar").clicked() {
                state.reload_active();
                ui.close_menu();
            }
        });

        ui.separator();

        for i in 0..state.pages.len() {
            let title = state.pages[i].spec.title.clone();
            if ui.selectable_label(state.active == i, title).clicked() {
                state.active = i;
            }
        }

        ui.separator();

        let page = state.active_page();
        if let Some(table) = &page.table {
            ui.label(format!(
                "{} registros, {} visibles",
                table.len(),
                page.visible.len()
            ));
        }

        if let Some(msg) = &page.error {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir datos de avance")
        .add_filter(
            "Datos soportados",
            &["xlsx", "xlsm", "xls", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_override(path);
    }
}
