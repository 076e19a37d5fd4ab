use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::{MetricColumn, TableSchema};
use crate::data::aggregate::{group_summary, medal_label, summarize, top_n, GroupRow};
use crate::state::PageState;
use crate::ui::chart;

// ---------------------------------------------------------------------------
// Central panel – KPI strip, ranked table, group summary, chart
// ---------------------------------------------------------------------------

/// Render the active dashboard page.
pub fn dashboard(ui: &mut Ui, page: &PageState) {
    let Some(table) = &page.table else {
        match &page.error {
            Some(err) => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.colored_label(Color32::RED, err);
                });
            }
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Cargando datos…");
                });
            }
        }
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Avance, Ranking y Ganadores");
            ui.add_space(8.0);

            let summary = summarize(table, &page.visible);
            kpi_strip(ui, &summary.metric_means, summary.participants, summary.winners, &table.schema);
            ui.separator();

            ui.heading("🏆 Ranking");
            let top = top_n(table, &page.visible, page.top_n);
            if top.is_empty() {
                ui.label("Sin datos para los filtros seleccionados.");
            } else {
                ui.push_id("ranking", |ui: &mut Ui| {
                    ranking_table(ui, table, &top);
                });
            }
            ui.add_space(16.0);

            let Some(group_col) = table.schema.group_columns.first() else {
                return;
            };
            ui.heading(format!("📍 Avance por {}", column_label(group_col)));
            let full_range: Vec<usize>;
            let group_indices: &[usize] = if page.spec.group_summary_filtered {
                &page.visible
            } else {
                full_range = (0..table.len()).collect();
                &full_range
            };
            let groups = group_summary(table, group_indices);
            if groups.is_empty() {
                ui.label("Sin datos.");
            } else {
                ui.push_id("grupos", |ui: &mut Ui| {
                    group_table(ui, &groups, &table.schema);
                });
                ui.add_space(16.0);
                chart::group_chart(ui, &groups, &table.schema);
            }
        });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

fn kpi_strip(
    ui: &mut Ui,
    metric_means: &[Option<f64>],
    participants: usize,
    winners: u64,
    schema: &TableSchema,
) {
    let n_cards = 2 + schema.metric_columns.len();
    ui.columns(n_cards, |cols: &mut [Ui]| {
        kpi_card(&mut cols[0], "👥 Participantes", &fmt_thousands(participants as u64));
        kpi_card(&mut cols[1], "🏆 Ganadores", &fmt_thousands(winners));
        for (i, metric) in schema.metric_columns.iter().enumerate() {
            let value = metric_means.get(i).copied().flatten();
            kpi_card(&mut cols[2 + i], &metric.label, &format_percent(value, metric));
        }
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).small().weak());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Ranked table
// ---------------------------------------------------------------------------

fn ranking_table(ui: &mut Ui, table: &crate::data::model::RecordTable, rows: &[usize]) {
    let schema = &table.schema;
    let n_cols = 3
        + schema.group_columns.len()
        + schema.metric_columns.len()
        + schema.display_columns.len();

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0), n_cols)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Ranking 🏅");
            });
            header.col(|ui| {
                ui.strong(&schema.id_column);
            });
            header.col(|ui| {
                ui.strong(&schema.name_column);
            });
            for col in &schema.group_columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
            for metric in &schema.metric_columns {
                header.col(|ui| {
                    ui.strong(format!("{} %", metric.label));
                });
            }
            for col in &schema.display_columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let rec = &table.records[rows[row.index()]];
                row.col(|ui| {
                    ui.label(medal_label(rec.ranking));
                });
                row.col(|ui| {
                    ui.label(&rec.hc);
                });
                row.col(|ui| {
                    ui.label(&rec.nombre);
                });
                for value in &rec.groups {
                    row.col(|ui| {
                        ui.label(value);
                    });
                }
                for (i, metric) in schema.metric_columns.iter().enumerate() {
                    let value = rec.metrics.get(i).copied().flatten();
                    row.col(|ui| {
                        ui.label(format_percent(value, metric));
                    });
                }
                for value in &rec.display {
                    row.col(|ui| {
                        ui.label(value);
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Group summary table
// ---------------------------------------------------------------------------

fn group_table(ui: &mut Ui, groups: &[GroupRow], schema: &TableSchema) {
    let group_col = schema.group_columns.first().map(String::as_str).unwrap_or("Grupo");

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(90.0), 1 + schema.metric_columns.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(group_col);
            });
            for metric in &schema.metric_columns {
                header.col(|ui| {
                    ui.strong(&metric.label);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, groups.len(), |mut row| {
                let group = &groups[row.index()];
                row.col(|ui| {
                    ui.label(&group.name);
                });
                for (i, metric) in schema.metric_columns.iter().enumerate() {
                    let value = group.means.get(i).copied().flatten();
                    row.col(|ui| {
                        ui.label(format_percent(value, metric));
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `12.3%` for a value scaled per the metric's storage, `N/A` for no data.
pub fn format_percent(value: Option<f64>, metric: &MetricColumn) -> String {
    match value {
        Some(v) => format!("{:.1}%", metric.scale.to_percent(v)),
        None => "N/A".to_string(),
    }
}

/// `1234567` → `1,234,567`.
pub fn fmt_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `DEMPARTAMENTO` → `Dempartamento`, for widget labels and headings.
pub fn column_label(column: &str) -> String {
    column
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PercentScale;

    fn metric(scale: PercentScale) -> MetricColumn {
        MetricColumn {
            column: "Avance".to_string(),
            label: "Avance".to_string(),
            scale,
        }
    }

    #[test]
    fn percent_formatting_honours_the_scale_flag() {
        assert_eq!(format_percent(Some(42.21), &metric(PercentScale::Percent)), "42.2%");
        assert_eq!(format_percent(Some(0.425), &metric(PercentScale::Fraction)), "42.5%");
        assert_eq!(format_percent(None, &metric(PercentScale::Percent)), "N/A");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1000), "1,000");
        assert_eq!(fmt_thousands(1234567), "1,234,567");
    }

    #[test]
    fn column_labels_are_title_cased() {
        assert_eq!(column_label("DEMPARTAMENTO"), "Dempartamento");
        assert_eq!(column_label("CLUSTER"), "Cluster");
        assert_eq!(column_label("AVANCE ENE PP"), "Avance Ene Pp");
    }
}
