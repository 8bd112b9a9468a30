//! The scrape-and-assemble run.
//!
//! Tickers are processed strictly one after another: ratio table, then
//! scores, then the block is folded into the [`OutputBook`]. A ticker whose
//! ratio table cannot be fetched becomes a placeholder block; nothing a
//! single ticker does aborts the run.

use crate::config::Config;
use crate::error::Result;
use crate::universe::{TickerEntry, TickerList};
use chrono::{Local, NaiveDate};
use futures::future;
use futures::stream::{self, StreamExt};
use std::path::Path;
use stockrisk_data::stockanalysis::{RatioProvider, ScoreProvider, StockAnalysisClient};
use stockrisk_output::{ExportFormat, Exporter, Layout, OutputBook, TickerBlock};
use tracing::{info, warn};

/// Sequential scraper over a ticker list.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ratios: RatioProvider,
    scores: ScoreProvider,
    tickers: TickerList,
    metrics: Vec<String>,
    layout: Layout,
}

impl Pipeline {
    /// Build a pipeline from a config.
    ///
    /// Fails when a metric column clashes with a fixed header.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = StockAnalysisClient::with_settings(config.fetch.clone())?;
        Ok(Self {
            ratios: RatioProvider::new(
                client.clone(),
                config.metrics.clone(),
                config.dates.clone(),
            ),
            scores: ScoreProvider::new(client),
            tickers: config.tickers.clone(),
            metrics: config.metric_columns(),
            layout: config.layout,
        })
    }

    /// Tickers in run order.
    pub const fn tickers(&self) -> &TickerList {
        &self.tickers
    }

    /// Metric columns of the output.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Fetch one ticker. Never fails: errors become a placeholder block.
    pub async fn process(&self, entry: &TickerEntry, today: NaiveDate) -> TickerBlock {
        let url = entry.url.as_deref();
        let ratios = self
            .ratios
            .fetch_ratios_as_of(&entry.symbol, url, today)
            .await;
        let scores = self.scores.fetch_scores(&entry.symbol, url).await;

        let block = TickerBlock::new(entry.symbol.as_str(), entry.name.as_str())
            .with_category(entry.category.map(|c| c.name().to_string()))
            .with_scores(scores);

        match ratios {
            Ok(table) => {
                info!(symbol = %entry.symbol, periods = table.len(), "ticker done");
                block.with_ratios(&table, &self.metrics)
            }
            Err(e) => {
                warn!(
                    symbol = %entry.symbol,
                    network = e.is_network(),
                    error = %e,
                    "no ratio table, writing placeholder"
                );
                block.failed(e.to_string())
            }
        }
    }

    /// Run every ticker, dating "current" periods today.
    pub async fn run(&self) -> OutputBook {
        self.run_with_progress(Local::now().date_naive(), |_, _| {})
            .await
    }

    /// Run every ticker with an explicit "today".
    ///
    /// `on_ticker` is called after each ticker, in order.
    pub async fn run_with_progress<F>(&self, today: NaiveDate, mut on_ticker: F) -> OutputBook
    where
        F: FnMut(&TickerEntry, &TickerBlock),
    {
        info!(symbols = ?self.tickers.symbols(), layout = %self.layout, "starting run");
        let book = OutputBook::new(self.metrics.clone()).with_layout(self.layout);

        stream::iter(self.tickers.entries())
            .then(|entry| async move { (entry, self.process(entry, today).await) })
            .inspect(|(entry, block)| on_ticker(*entry, block))
            .fold(book, |book, (_, block)| future::ready(book.with_block(block)))
            .await
    }
}

/// The format to write: explicit, else from the file extension, else xlsx.
pub fn resolve_format(path: &Path, explicit: Option<ExportFormat>) -> ExportFormat {
    explicit
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or_default()
}

/// Write a finished book, replacing any existing file.
pub fn write_book(book: &OutputBook, path: &Path, format: ExportFormat) -> Result<()> {
    book.export_to_file(path, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::path::PathBuf;
    use stockrisk_data::{MetricRule, MetricVocabulary};

    #[test]
    fn test_resolve_format() {
        let path = PathBuf::from("Stock_Risk_Scores.xlsx");
        assert_eq!(resolve_format(&path, None), ExportFormat::Xlsx);
        assert_eq!(
            resolve_format(&path, Some(ExportFormat::Csv)),
            ExportFormat::Csv
        );
        assert_eq!(
            resolve_format(Path::new("scores.json"), None),
            ExportFormat::Json
        );
        assert_eq!(resolve_format(Path::new("scores"), None), ExportFormat::Xlsx);
    }

    #[test]
    fn test_pipeline_rejects_clashing_metric() {
        let config = Config {
            metrics: MetricVocabulary::new(vec![MetricRule::new(
                "Altman",
                "Altman Z-Score",
            )]),
            ..Config::default()
        };
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(PipelineError::ReservedMetric(_))
        ));
    }

    #[test]
    fn test_pipeline_from_default_config() {
        let pipeline = Pipeline::from_config(&Config::default()).unwrap();
        assert_eq!(pipeline.tickers().len(), 6);
        assert_eq!(pipeline.metrics().len(), 6);
    }
}
