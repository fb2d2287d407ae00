//! Dashboard configuration file support.
//!
//! Settings are read from a TOML file:
//!
//! ```toml
//! [data]
//! path = "data/raw/hospital_daily.csv"
//!
//! [model]
//! path = "models/baseline_linreg.json"
//!
//! [display]
//! window = 30
//! smooth = true
//!
//! [alert]
//! percentile = 75
//! interpolation = "lower"
//!
//! [ingestion]
//! scope = "REGION"
//! region_code = "11"
//! icu_capacity = 7000
//! use_icu_rate = true
//!
//! [export]
//! path = "sph_forecast_export.csv"
//! ```
//!
//! Only `[data]` and `[model]` are required.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::alert::{AlertPolicy, Interpolation, DEFAULT_PERCENTILE};

/// History window lengths the dashboard offers, in days.
pub const WINDOW_OPTIONS: [usize; 6] = [7, 14, 30, 60, 90, 180];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataSettings,
    pub model: ModelSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub alert: AlertSettings,
    #[serde(default)]
    pub ingestion: IngestionSettings,
    #[serde(default)]
    pub export: Option<ExportSettings>,
}

/// Location of the normalized daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    pub path: PathBuf,
}

/// Location of the fitted model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_window")]
    pub window: usize,
    /// Overlay a 7-day moving average on the history window.
    #[serde(default = "default_smooth")]
    pub smooth: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_percentile")]
    pub percentile: u8,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationScope {
    /// National series: counts are summed across regions.
    #[default]
    Fr,
    /// A single region selected by `region_code`.
    Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionSettings {
    #[serde(default)]
    pub scope: AggregationScope,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default = "default_icu_capacity")]
    pub icu_capacity: u32,
    #[serde(default = "default_use_icu_rate")]
    pub use_icu_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub path: PathBuf,
}

fn default_window() -> usize {
    30
}

fn default_smooth() -> bool {
    true
}

fn default_percentile() -> u8 {
    DEFAULT_PERCENTILE
}

fn default_icu_capacity() -> u32 {
    7000
}

fn default_use_icu_rate() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window: default_window(),
            smooth: default_smooth(),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            percentile: default_percentile(),
            interpolation: Interpolation::default(),
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            scope: AggregationScope::default(),
            region_code: None,
            icu_capacity: default_icu_capacity(),
            use_icu_rate: default_use_icu_rate(),
        }
    }
}

impl AlertSettings {
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy::new(self.percentile).with_interpolation(self.interpolation)
    }
}

impl IngestionSettings {
    /// Region filter to apply when the source carries a `region` column.
    pub fn region_filter(&self) -> Option<&str> {
        match self.scope {
            AggregationScope::Fr => None,
            AggregationScope::Region => self.region_code.as_deref(),
        }
    }
}

impl Settings {
    /// Minimal settings pointing at a data file and a model artifact.
    pub fn new(data_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataSettings {
                path: data_path.into(),
            },
            model: ModelSettings {
                path: model_path.into(),
            },
            display: DisplaySettings::default(),
            alert: AlertSettings::default(),
            ingestion: IngestionSettings::default(),
            export: None,
        }
    }

    /// Load settings from a TOML file.
    ///
    /// Relative data, model and export paths are resolved against the
    /// directory holding the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }

        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location.
    ///
    /// Searches for `forecast.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, SettingsError> {
        let search_paths = [
            PathBuf::from("forecast.toml"),
            PathBuf::from("rust_backend/forecast.toml"),
            PathBuf::from("../forecast.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SettingsError::Invalid(
            "No forecast.toml found in standard locations".to_string(),
        ))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !WINDOW_OPTIONS.contains(&self.display.window) {
            return Err(SettingsError::Invalid(format!(
                "display.window must be one of {:?}, got {}",
                WINDOW_OPTIONS, self.display.window
            )));
        }

        if self.ingestion.scope == AggregationScope::Region
            && self
                .ingestion
                .region_code
                .as_deref()
                .map_or(true, |code| code.trim().is_empty())
        {
            return Err(SettingsError::Invalid(
                "REGION scope requires 'ingestion.region_code'".to_string(),
            ));
        }

        if self.ingestion.icu_capacity == 0 {
            return Err(SettingsError::Invalid(
                "ingestion.icu_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.data.path);
        resolve(&mut self.model.path);
        if let Some(export) = self.export.as_mut() {
            resolve(&mut export.path);
        }
    }
}
