use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, LineStyle, MarkerShape, Plot, PlotPoint,
    Points, Text, VLine,
};

use crate::state::AppState;
use crate::ui::{placeholder, to_color32};
use crate::view::{HistogramChart, ScatterChart, ViewSlot};

const CHART_HEIGHT: f32 = 320.0;
const MIN_MARKER_RADIUS: f32 = 2.0;
const MAX_MARKER_RADIUS: f32 = 10.0;
const FIXED_MARKER_RADIUS: f32 = 3.0;

// ---------------------------------------------------------------------------
// Charts tab (central panel)
// ---------------------------------------------------------------------------

/// Render the four charts in a two-by-two grid.
pub fn charts_tab(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a KOI table to explore  (File → Open…)");
        });
        return;
    };

    ui.columns(2, |cols| {
        scatter_slot(&mut cols[0], "dist_temp_chart", &view.dist_temp);
        scatter_slot(&mut cols[1], "celestial_chart", &view.celestial);
    });
    ui.add_space(20.0);
    ui.columns(2, |cols| {
        histogram_slot(&mut cols[0], "relative_dist_chart", &view.relative_dist);
        scatter_slot(&mut cols[1], "mstar_tstar_chart", &view.mstar_tstar);
    });
}

fn scatter_slot(ui: &mut Ui, id: &str, slot: &ViewSlot<ScatterChart>) {
    match slot {
        ViewSlot::Placeholder(message) => placeholder(ui, message),
        ViewSlot::Ready(chart) => scatter_chart(ui, id, chart),
    }
}

fn histogram_slot(ui: &mut Ui, id: &str, slot: &ViewSlot<HistogramChart>) {
    match slot {
        ViewSlot::Placeholder(message) => placeholder(ui, message),
        ViewSlot::Ready(chart) => histogram_chart(ui, id, chart),
    }
}

/// Marker radius for a size value: area grows linearly with the value.
fn marker_radius(size: Option<f64>, size_max: Option<f64>) -> f32 {
    match (size, size_max) {
        (Some(s), Some(max)) if max > 0.0 && s.is_finite() && s > 0.0 => {
            let scale = (s / max).sqrt() as f32;
            MIN_MARKER_RADIUS + (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS) * scale
        }
        _ => FIXED_MARKER_RADIUS,
    }
}

fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    ui.heading(chart.title.as_str());

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let color = to_color32(series.color);
                if chart.size_max.is_none() {
                    let points: Vec<[f64; 2]> = series.points.iter().map(|p| [p.x, p.y]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .name(&series.name)
                            .color(color)
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(FIXED_MARKER_RADIUS),
                    );
                    continue;
                }
                // Sized markers: one item per point, grouped in the legend by name.
                for p in &series.points {
                    plot_ui.points(
                        Points::new(vec![[p.x, p.y]])
                            .name(&series.name)
                            .color(color)
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(marker_radius(p.size, chart.size_max)),
                    );
                }
            }
        });
}

fn histogram_chart(ui: &mut Ui, id: &str, chart: &HistogramChart) {
    ui.heading(chart.title.as_str());

    let width = match chart.bin_edges.as_slice() {
        [first, second, ..] => second - first,
        _ => 1.0,
    };
    let peak = chart
        .series
        .iter()
        .flat_map(|s| s.counts.iter().copied())
        .max()
        .unwrap_or(0) as f64;

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            for (i, series) in chart.series.iter().enumerate() {
                let [r, g, b] = series.color.0;
                let fill = Color32::from_rgba_unmultiplied(r, g, b, 140);

                let bars: Vec<Bar> = series
                    .counts
                    .iter()
                    .zip(chart.bin_edges.iter())
                    .map(|(&count, &left)| Bar::new(left + width / 2.0, count as f64).width(width))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(fill));

                // Marginal distribution above the bars, one row per status.
                if let Some(s) = &series.summary {
                    let y = peak * 1.1 + (i as f64 + 1.0) * (peak * 0.08).max(0.5);
                    let elem = BoxElem::new(y, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                        .box_width((peak * 0.05).max(0.3))
                        .fill(fill);
                    plot_ui.box_plot(
                        BoxPlot::new(vec![elem])
                            .name(&series.name)
                            .color(to_color32(series.color))
                            .horizontal(),
                    );
                }
            }

            plot_ui.vline(
                VLine::new(chart.marker.x)
                    .name(&chart.marker.label)
                    .color(Color32::DARK_GRAY)
                    .style(LineStyle::Dotted { spacing: 6.0 }),
            );
            plot_ui.text(Text::new(
                PlotPoint::new(chart.marker.x, peak.max(1.0)),
                chart.marker.label.clone(),
            ));
        });
}
