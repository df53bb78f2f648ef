mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use anyhow::{Context, Result};
use app::KeplerDashApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading configuration")?;
    let startup_dataset = config.dataset_path.clone();
    let mut state = AppState::new(config).context("initialising dashboard")?;

    // Derivation happens here, before the window accepts any input.
    if let Some(path) = startup_dataset {
        if let Err(e) = state.load_path(&path) {
            state.report_error(&e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kepler Dash – Exoplanet Data Visualization",
        options,
        Box::new(|_cc| Ok(Box::new(KeplerDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
