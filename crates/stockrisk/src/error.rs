//! Errors that abort a run.

use std::path::PathBuf;
use stockrisk_data::DataError;
use stockrisk_output::{ExportError, ReportError};
use thiserror::Error;

/// Fatal pipeline errors. Per-ticker fetch failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration file could not be read or written.
    #[error("Config file {path}: {source}")]
    ConfigIo {
        /// File that was accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for [`crate::Config`].
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// A metric's output name is one of the fixed column headers.
    #[error("Metric column '{0}' clashes with a fixed column")]
    ReservedMetric(String),

    /// The HTTP client could not be built.
    #[error("Client setup failed: {0}")]
    Client(#[from] DataError),

    /// The output file could not be written.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    /// The run report could not be written.
    #[error("Report failed: {0}")]
    Report(#[from] ReportError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
