//! Run configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "tickers": [{"symbol": "AA", "name": "Alcoa", "category": "supplier"}],
//!   "fetch": {"attempts": 5},
//!   "layout": "per-ticker"
//! }
//! ```

use crate::error::{PipelineError, Result};
use crate::universe::TickerList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stockrisk_data::{DateRules, FetchSettings, MetricVocabulary};
use stockrisk_output::{DEFAULT_OUTPUT_FILE, Layout, is_fixed_column};
use tracing::{debug, info};

/// Configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Companies to scrape, in output order.
    pub tickers: TickerList,
    /// Target metrics: label pattern and output column name.
    pub metrics: MetricVocabulary,
    /// Labels that date a period "today" (`today_markers`).
    #[serde(flatten)]
    pub dates: DateRules,
    /// HTTP and retry settings.
    pub fetch: FetchSettings,
    /// Output file.
    pub output: PathBuf,
    /// Spreadsheet layout.
    pub layout: Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickers: TickerList::default(),
            metrics: MetricVocabulary::default(),
            dates: DateRules::default(),
            fetch: FetchSettings::default(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            layout: Layout::default(),
        }
    }
}

impl Config {
    /// Platform config file location.
    ///
    /// - Linux: `~/.config/stockrisk/config.json`
    /// - macOS: `~/Library/Application Support/stockrisk/config.json`
    /// - Windows: `%APPDATA%\stockrisk\config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stockrisk").join("config.json"))
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| PipelineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that no metric column reuses a fixed header such as `Ticker`.
    pub fn validate(&self) -> Result<()> {
        match self
            .metric_columns()
            .into_iter()
            .find(|name| is_fixed_column(name))
        {
            Some(name) => Err(PipelineError::ReservedMetric(name)),
            None => Ok(()),
        }
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must load. Otherwise the platform config file is
    /// used when it exists, and the built-in defaults when it does not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading config");
            return Self::load(path);
        }
        match Self::default_path().filter(|p| p.is_file()) {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => {
                debug!("no config file, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            PipelineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Output column order for metrics.
    pub fn metric_columns(&self) -> Vec<String> {
        self.metrics.canonical_names()
    }
}
