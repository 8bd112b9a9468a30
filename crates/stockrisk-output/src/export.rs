//! Export of an [`OutputBook`] to xlsx, CSV or JSON.

use crate::book::{Layout, OutputBook};
use crate::xlsx;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Workbook rendering error.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Excel workbook.
    #[default]
    Xlsx,

    /// Comma-separated values, consolidated table only.
    Csv,

    /// Pretty-printed JSON.
    Json,
}

impl ExportFormat {
    /// Returns all formats.
    pub const fn all() -> [Self; 3] {
        [Self::Xlsx, Self::Csv, Self::Json]
    }

    /// Get the file extension for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::all()
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown format '{s}' (expected xlsx, csv or json)"))
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to bytes in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError>;

    /// Export data to a file in the specified format, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_bytes(format)?;
        let mut file = File::create(path)?;
        file.write_all(&content)?;
        info!(path = %path.display(), %format, bytes = content.len(), "output written");
        Ok(())
    }
}

impl Exporter for OutputBook {
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Xlsx => Ok(xlsx::to_xlsx_bytes(self)?),
            ExportFormat::Csv => {
                let table = self.consolidated();
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(table.header())?;
                for row in table.rows() {
                    wtr.write_record(row)?;
                }
                Ok(wtr.into_inner().map_err(|e| e.into_error())?)
            }
            ExportFormat::Json => match self.layout() {
                Layout::Consolidated => Ok(serde_json::to_vec_pretty(&self.consolidated())?),
                Layout::PerTicker => Ok(serde_json::to_vec_pretty(self.blocks())?),
            },
        }
    }
}
