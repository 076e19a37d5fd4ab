use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::generate_palette;
use crate::config::TableSchema;
use crate::data::aggregate::GroupRow;

// ---------------------------------------------------------------------------
// Group summary bar chart
// ---------------------------------------------------------------------------

/// One bar cluster per group, one series per metric, percent on the y axis.
/// Groups arrive already ordered by the primary metric.
pub fn group_chart(ui: &mut Ui, groups: &[GroupRow], schema: &TableSchema) {
    if groups.is_empty() || schema.metric_columns.is_empty() {
        return;
    }

    let n_series = schema.metric_columns.len();
    let colors = generate_palette(n_series);
    let bar_width = 0.8 / n_series as f64;

    let charts: Vec<BarChart> = schema
        .metric_columns
        .iter()
        .enumerate()
        .map(|(m, metric)| {
            let bars: Vec<Bar> = groups
                .iter()
                .enumerate()
                .filter_map(|(g, group)| {
                    let mean = group.means.get(m).copied().flatten()?;
                    let x = g as f64 + (m as f64 - (n_series as f64 - 1.0) / 2.0) * bar_width;
                    Some(
                        Bar::new(x, metric.scale.to_percent(mean))
                            .width(bar_width * 0.9)
                            .name(&group.name),
                    )
                })
                .collect();
            BarChart::new(bars).color(colors[m]).name(&metric.label)
        })
        .collect();

    let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();

    Plot::new("group_chart")
        .legend(Legend::default())
        .y_axis_label("%")
        .height(260.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.05 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
