use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct KeplerDashApp {
    pub state: AppState,
}

impl KeplerDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for KeplerDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts or raw data ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Charts => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    charts::charts_tab(ui, &self.state);
                });
            }
            Tab::Data => table::table_tab(ui, &mut self.state),
        });
    }
}
