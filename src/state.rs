use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{ConfigError, DashboardConfig};
use crate::data::derive::DerivationEngine;
use crate::data::filter::{FilterState, init_filter_state};
use crate::data::loader;
use crate::data::model::{PlanetDataset, StarSize};
use crate::view::{ViewBuilder, ViewBundle};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Central area tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Charts,
    Data,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    engine: DerivationEngine,
    views: ViewBuilder,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<PlanetDataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Selection being edited in the filter panel. Not applied until the
    /// user presses Apply.
    pub filter: FilterState,

    /// Views for the last applied filter.
    pub view: Option<ViewBundle>,

    pub tab: Tab,

    /// Current page of the raw data table.
    pub table_page: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self, ConfigError> {
        let engine = DerivationEngine::new(&config.derivation)?;
        let views = ViewBuilder::new(&config)?;
        Ok(Self {
            engine,
            views,
            dataset: None,
            source: None,
            filter: FilterState::default(),
            view: None,
            tab: Tab::default(),
            table_page: 0,
            status_message: None,
        })
    }

    pub fn views(&self) -> &ViewBuilder {
        &self.views
    }

    /// Read a file, derive its columns and make it the current dataset.
    /// On failure the previous dataset stays loaded.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let raws = loader::load_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        let dataset = self.engine.derive_dataset(raws);
        log::info!(
            "Loaded {} records, {} passthrough columns {:?}",
            dataset.len(),
            dataset.passthrough_columns.len(),
            dataset.passthrough_columns
        );
        self.source = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a derived dataset, reset the filters to span it and show the
    /// initial views.
    pub fn set_dataset(&mut self, dataset: PlanetDataset) {
        self.filter = init_filter_state(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.apply();
    }

    /// Recompute every view from the pending filter. The only place views
    /// change.
    pub fn apply(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let bundle = self.views.recompute(ds, &self.filter);
        self.table_page = 0;
        self.view = Some(bundle);
    }

    /// Update the pending radius window from the range controls.
    pub fn set_radius_range(&mut self, min: f64, max: f64) {
        self.filter.radius_min = min;
        self.filter.radius_max = max;
        if let Some((lo, hi)) = self.dataset.as_ref().and_then(|ds| ds.rplanet_range) {
            self.filter.clamp_to((lo, hi));
        }
    }

    /// Toggle a star size in the pending selection.
    pub fn toggle_star_size(&mut self, size: StarSize) {
        self.filter.toggle_star_size(size);
    }

    /// Report a failure in the top bar.
    pub fn report_error(&mut self, err: &anyhow::Error) {
        log::error!("{err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }
}
