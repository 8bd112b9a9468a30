//! Run report: what happened to each ticker.

use crate::book::{OutputBook, TickerBlock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerStatus {
    /// Ratio table written.
    Ok {
        /// Periods written for the ticker.
        rows: usize,
    },
    /// Ratio fetch failed; a placeholder was written.
    Placeholder {
        /// Error that caused the placeholder.
        reason: String,
    },
}

/// Report line for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerReport {
    /// Ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Outcome.
    #[serde(flatten)]
    pub status: TickerStatus,
    /// Whether at least one score was found.
    pub has_scores: bool,
}

impl From<&TickerBlock> for TickerReport {
    fn from(block: &TickerBlock) -> Self {
        let status = block.failure.as_ref().map_or_else(
            || TickerStatus::Ok {
                rows: block.periods.len(),
            },
            |reason| TickerStatus::Placeholder {
                reason: reason.clone(),
            },
        );
        Self {
            symbol: block.symbol.clone(),
            name: block.name.clone(),
            status,
            has_scores: !block.scores.is_empty(),
        }
    }
}

/// A report of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Output file, once written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// One entry per ticker, in run order.
    pub tickers: Vec<TickerReport>,
}

impl RunReport {
    /// Create a report from a finished book.
    pub fn from_book(book: &OutputBook) -> Self {
        Self {
            timestamp: Utc::now(),
            output: None,
            tickers: book.blocks().iter().map(TickerReport::from).collect(),
        }
    }

    /// Record the output file.
    pub fn with_output(mut self, path: impl Into<String>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Tickers whose ratio table was written.
    pub fn succeeded(&self) -> usize {
        self.tickers
            .iter()
            .filter(|t| matches!(t.status, TickerStatus::Ok { .. }))
            .count()
    }

    /// Tickers written as placeholders.
    pub fn placeholders(&self) -> usize {
        self.tickers.len() - self.succeeded()
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Plain-text summary table.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<8} {:<32} {:<12} {}\n",
            "Ticker", "Name", "Status", "Detail"
        ));
        for t in &self.tickers {
            let (status, detail) = match &t.status {
                TickerStatus::Ok { rows } => ("ok", format!("{rows} periods")),
                TickerStatus::Placeholder { reason } => ("placeholder", reason.clone()),
            };
            let scores = if t.has_scores { "" } else { ", no scores" };
            out.push_str(&format!(
                "{:<8} {:<32} {:<12} {detail}{scores}\n",
                t.symbol, t.name, status
            ));
        }
        out.push_str(&format!(
            "{} of {} tickers fetched",
            self.succeeded(),
            self.tickers.len()
        ));
        if let Some(path) = &self.output {
            out.push_str(&format!(", written to {path}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockrisk_data::ScorePair;

    fn book() -> OutputBook {
        let mut ok = TickerBlock::new("AA", "Alcoa").with_scores(ScorePair {
            altman_z: "2.07".to_string(),
            piotroski_f: "7".to_string(),
        });
        ok.periods = vec![crate::book::PeriodValues {
            date: chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            values: vec!["1.5".to_string()],
        }];
        OutputBook::new(vec!["Current Ratio".to_string()])
            .with_block(ok)
            .with_block(TickerBlock::new("ZZZZ", "Nobody").failed("HTTP 404"))
    }

    #[test]
    fn test_report_from_book() {
        let report = RunReport::from_book(&book());
        assert_eq!(report.tickers.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.placeholders(), 1);
        assert_eq!(report.tickers[0].status, TickerStatus::Ok { rows: 1 });
        assert!(report.tickers[0].has_scores);
        assert!(!report.tickers[1].has_scores);
    }

    #[test]
    fn test_report_json() {
        let report = RunReport::from_book(&book()).with_output("Stock_Risk_Scores.xlsx");
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["output"], "Stock_Risk_Scores.xlsx");
        assert_eq!(value["tickers"][0]["status"], "ok");
        assert_eq!(value["tickers"][0]["rows"], 1);
        assert_eq!(value["tickers"][1]["status"], "placeholder");
        assert_eq!(value["tickers"][1]["reason"], "HTTP 404");
    }

    #[test]
    fn test_summary() {
        let summary = RunReport::from_book(&book()).summary();
        assert!(summary.contains("AA"));
        assert!(summary.contains("placeholder"));
        assert!(summary.contains("HTTP 404, no scores"));
        assert!(summary.ends_with("1 of 2 tickers fetched"));
    }
}
