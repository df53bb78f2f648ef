pub mod charts;
pub mod panels;
pub mod table;

use eframe::egui::{Color32, RichText, Ui};

use crate::color::ChartColor;

/// Renderer-side colour for a view payload colour.
pub fn to_color32(c: ChartColor) -> Color32 {
    let [r, g, b] = c.0;
    Color32::from_rgb(r, g, b)
}

/// Empty-selection message in place of a chart or table.
pub fn placeholder(ui: &mut Ui, message: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.label(RichText::new(message).italics());
    });
}
