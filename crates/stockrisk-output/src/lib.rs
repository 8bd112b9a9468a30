#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockrisk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod book;
pub mod export;
pub mod report;
pub mod xlsx;

pub use book::{
    DEFAULT_OUTPUT_FILE, FIXED_COLUMNS, Layout, OutputBook, OutputTable, PeriodValues, SHEET_NAME,
    TickerBlock, is_fixed_column,
};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{ReportError, RunReport, TickerReport, TickerStatus};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
