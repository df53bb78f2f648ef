use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::star_size_color;
use crate::data::model::{Category, StarSize};
use crate::state::{AppState, Tab};
use crate::ui::to_color32;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Edits only the pending filter; views
/// change when Apply is pressed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(bounds) = state.dataset.as_ref().map(|ds| ds.rplanet_range) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Planet radius window ----
            ui.strong("Planet radius (Earth radii)");
            match bounds {
                Some((lo, hi)) => {
                    let mut min = state.filter.radius_min;
                    let mut max = state.filter.radius_max;
                    let min_changed = ui
                        .add(egui::Slider::new(&mut min, lo..=hi).step_by(1.0).text("min"))
                        .changed();
                    let max_changed = ui
                        .add(egui::Slider::new(&mut max, lo..=hi).step_by(1.0).text("max"))
                        .changed();
                    if min_changed || max_changed {
                        state.set_radius_range(min, max);
                    }
                    ui.label(
                        RichText::new(format!(
                            "{:.2} < RPLANET < {:.2}",
                            state.filter.radius_min, state.filter.radius_max
                        ))
                        .weak(),
                    );
                }
                None => {
                    ui.label("No finite RPLANET values.");
                }
            }
            ui.separator();

            // ---- Star size multi-select ----
            let n_selected = state.filter.star_sizes.len();
            let n_total = StarSize::ALL.len();
            ui.strong(format!("Star size  ({n_selected}/{n_total})"));
            for &size in StarSize::ALL {
                let mut checked = state.filter.star_sizes.contains(&size);
                let text = RichText::new(size.label()).color(to_color32(star_size_color(size)));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_star_size(size);
                }
            }
            ui.separator();

            if ui
                .add_sized([ui.available_width(), 28.0], egui::Button::new("Apply"))
                .clicked()
            {
                state.apply();
            }

            // ---- Status legend ----
            ui.add_space(12.0);
            ui.strong("Status");
            for (label, color) in state.views().palette().legend_entries() {
                ui.label(RichText::new(format!("● {label}")).color(to_color32(color)));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Charts, "Charts");
        ui.selectable_value(&mut state.tab, Tab::Data, "Data");

        ui.separator();

        if let Some(ds) = &state.dataset {
            let matched = state.view.as_ref().map_or(0, |v| v.matched);
            let source = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!("{source}: {} objects loaded, {matched} selected", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open KOI table")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            state.report_error(&e);
        }
    }
}
