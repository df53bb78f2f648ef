use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::color::StatusPalette;
use crate::data::derive::DerivationEngine;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "KEPLER_DASH_CONFIG";
/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "kepler-dash.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} bins: {reason}")]
    BinEdges { name: &'static str, reason: String },
    #[error("colour for status '{status}' is not a CSS name or hex code: {value:?}")]
    Color { status: &'static str, value: String },
    #[error("{field} must be {reason}")]
    InvalidValue { field: &'static str, reason: &'static str },
}

// ---------------------------------------------------------------------------
// Derivation thresholds
// ---------------------------------------------------------------------------

/// Bin edges for each derived category. Each list has one more edge than
/// its category has labels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// RSTAR edges for small / similar / bigger.
    pub star_size_edges: Vec<f64>,
    /// TPLANET edges for low / optimal / high / extreme.
    pub temp_edges: Vec<f64>,
    /// RPLANET edges for low / optimal / high / extreme.
    pub gravity_edges: Vec<f64>,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            star_size_edges: vec![0.0, 0.8, 1.2, 100.0],
            temp_edges: vec![0.0, 200.0, 400.0, 500.0, 5000.0],
            gravity_edges: vec![0.0, 0.5, 2.0, 4.0, 100.0],
        }
    }
}

/// Status colours, as CSS colour names or `#rrggbb` codes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    pub challenging: String,
    pub promising: String,
    pub extreme: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            challenging: "lightgray".to_string(),
            promising: "#1F85DE".to_string(),
            extreme: "#DE251F".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Startup configuration. Read once, never modified afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened automatically at startup.
    pub dataset_path: Option<PathBuf>,
    pub derivation: DerivationConfig,
    pub status_colors: StatusColors,
    /// Number of equal-width bins in the relative distance histogram.
    pub histogram_bins: usize,
    /// Rows per page in the raw data table.
    pub table_page_size: usize,
    /// Passthrough columns left out of the raw data table.
    pub table_hidden_columns: Vec<String>,
    /// Shown in every view when the filters match nothing.
    pub empty_message: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            derivation: DerivationConfig::default(),
            status_colors: StatusColors::default(),
            histogram_bins: 30,
            table_page_size: 40,
            table_hidden_columns: vec!["ROW".to_string()],
            empty_message: "No data for this selection, please broaden the filters.".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration file and load it, falling back to defaults
    /// when no file is configured.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in configuration");
        Ok(Self::default())
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check every field that can be wrong without failing deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::InvalidValue {
                field: "histogram_bins",
                reason: "at least 1",
            });
        }
        if self.table_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "table_page_size",
                reason: "at least 1",
            });
        }
        DerivationEngine::new(&self.derivation)?;
        StatusPalette::from_config(&self.status_colors)?;
        Ok(())
    }
}
