//! Output model: one block per ticker, accumulated into a book.
//!
//! A [`TickerBlock`] carries one ticker's identity, scores and reporting
//! periods with values aligned to the book's metric columns. An
//! [`OutputBook`] is the accumulator threaded through a run; it renders the
//! consolidated [`OutputTable`] or one table per ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockrisk_data::period::DATE_FORMAT;
use stockrisk_data::stockanalysis::{RatioTable, ScorePair, UPGRADE_MARKER, clean_value};

/// Sheet name of the consolidated layout.
pub const SHEET_NAME: &str = "Stock_Risk_Scores";

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "Stock_Risk_Scores.xlsx";

/// Date column header.
pub const DATE_COLUMN: &str = "Date";

/// Ticker column header.
pub const TICKER_COLUMN: &str = "Ticker";

/// Altman Z-Score column header.
pub const ALTMAN_Z_COLUMN: &str = "Altman Z-Score";

/// Piotroski F-Score column header.
pub const PIOTROSKI_F_COLUMN: &str = "Piotroski F-Score";

/// Category column header.
pub const CATEGORY_COLUMN: &str = "Category";

/// Headers the book writes itself; metric columns may not reuse them.
pub const FIXED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    TICKER_COLUMN,
    ALTMAN_Z_COLUMN,
    PIOTROSKI_F_COLUMN,
    CATEGORY_COLUMN,
];

/// Whether `name` collides with a fixed header, ignoring case.
pub fn is_fixed_column(name: &str) -> bool {
    FIXED_COLUMNS
        .iter()
        .any(|fixed| fixed.eq_ignore_ascii_case(name.trim()))
}

/// Spreadsheet layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One sheet with every ticker's rows.
    #[default]
    Consolidated,

    /// One sheet per ticker, scores on top.
    PerTicker,
}

impl Layout {
    /// Returns all layouts.
    pub const fn all() -> [Self; 2] {
        [Self::Consolidated, Self::PerTicker]
    }

    /// Returns the command-line name of the layout.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Consolidated => "consolidated",
            Self::PerTicker => "per-ticker",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|layout| layout.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown layout '{s}' (expected consolidated or per-ticker)"))
    }
}

/// Values of one reporting period, aligned with [`OutputBook::metrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValues {
    /// Period date.
    pub date: NaiveDate,
    /// One value per book metric; empty when missing.
    pub values: Vec<String>,
}

/// Everything written for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerBlock {
    /// Ticker symbol.
    pub symbol: String,
    /// Display name; per-ticker sheets are named after it.
    pub name: String,
    /// Category label, if the ticker has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Risk scores; empty strings when unavailable.
    #[serde(flatten)]
    pub scores: ScorePair,
    /// Reporting periods, in source order.
    pub periods: Vec<PeriodValues>,
    /// Why the ratio table is missing, for placeholder blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl TickerBlock {
    /// Create an empty block.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            category: None,
            scores: ScorePair::default(),
            periods: Vec::new(),
            failure: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Set the scores, blanking placeholder values.
    pub fn with_scores(mut self, scores: ScorePair) -> Self {
        self.scores = ScorePair {
            altman_z: clean_value(&scores.altman_z),
            piotroski_f: clean_value(&scores.piotroski_f),
        };
        self
    }

    /// Fill periods from a ratio table, reordering values to `metrics`.
    ///
    /// Metrics the source table lacks become empty values.
    pub fn with_ratios(mut self, ratios: &RatioTable, metrics: &[String]) -> Self {
        self.periods = ratios
            .rows()
            .iter()
            .map(|row| PeriodValues {
                date: row.date,
                values: metrics
                    .iter()
                    .map(|m| ratios.value(row, m).to_string())
                    .collect(),
            })
            .collect();
        self.failure = None;
        self
    }

    /// Mark the block as a placeholder for a ticker whose ratios failed.
    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.periods.clear();
        self.failure = Some(reason.into());
        self
    }

    /// Whether the ratio table is missing.
    pub const fn is_placeholder(&self) -> bool {
        self.failure.is_some()
    }
}

/// A header plus string rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl OutputTable {
    /// Column headers.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, each as wide as the header.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Accumulated output of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBook {
    metrics: Vec<String>,
    blocks: Vec<TickerBlock>,
    #[serde(skip)]
    layout: Layout,
}

impl OutputBook {
    /// Create an empty book with fixed metric columns.
    pub fn new(metrics: Vec<String>) -> Self {
        Self {
            metrics,
            blocks: Vec::new(),
            layout: Layout::default(),
        }
    }

    /// Set the spreadsheet layout.
    pub const fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Append a block, returning the book; the fold step of a run.
    pub fn with_block(mut self, block: TickerBlock) -> Self {
        self.push(block);
        self
    }

    /// Append a block.
    pub fn push(&mut self, block: TickerBlock) {
        self.blocks.push(block);
    }

    /// Metric columns, in output order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Blocks, in ticker order.
    pub fn blocks(&self) -> &[TickerBlock] {
        &self.blocks
    }

    /// Spreadsheet layout.
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no ticker has been added.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether any ticker carries a category.
    pub fn has_category(&self) -> bool {
        self.blocks.iter().any(|b| b.category.is_some())
    }

    /// Header of the consolidated table.
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.metrics.len() + 5);
        header.push(DATE_COLUMN.to_string());
        header.extend(self.metrics.iter().cloned());
        header.push(TICKER_COLUMN.to_string());
        header.push(ALTMAN_Z_COLUMN.to_string());
        header.push(PIOTROSKI_F_COLUMN.to_string());
        if self.has_category() {
            header.push(CATEGORY_COLUMN.to_string());
        }
        header
    }

    /// All tickers in one table.
    ///
    /// A placeholder block contributes one row with empty date and metrics.
    /// Rows with an `Upgrade` marker in any field are dropped; scores are
    /// cleaned first so a locked score never drops a ticker's rows.
    pub fn consolidated(&self) -> OutputTable {
        let with_category = self.has_category();
        let mut rows = Vec::new();

        for block in &self.blocks {
            let tail = |row: &mut Vec<String>| {
                row.push(block.symbol.clone());
                row.push(clean_value(&block.scores.altman_z));
                row.push(clean_value(&block.scores.piotroski_f));
                if with_category {
                    row.push(block.category.clone().unwrap_or_default());
                }
            };

            if block.is_placeholder() {
                let mut row = vec![String::new(); self.metrics.len() + 1];
                tail(&mut row);
                rows.push(row);
                continue;
            }
            for period in &block.periods {
                let mut row = Vec::with_capacity(self.metrics.len() + 5);
                row.push(period.date.format(DATE_FORMAT).to_string());
                row.extend(self.aligned(&period.values));
                tail(&mut row);
                rows.push(row);
            }
        }

        rows.retain(|row| !row.iter().any(|field| field.contains(UPGRADE_MARKER)));
        OutputTable {
            header: self.header(),
            rows,
        }
    }

    /// The table written below the scores on a ticker's own sheet.
    ///
    /// Columns are `Date`, the metrics, then `Ticker`.
    pub fn ticker_table(&self, block: &TickerBlock) -> OutputTable {
        let mut header = Vec::with_capacity(self.metrics.len() + 2);
        header.push(DATE_COLUMN.to_string());
        header.extend(self.metrics.iter().cloned());
        header.push(TICKER_COLUMN.to_string());

        let rows = block
            .periods
            .iter()
            .map(|period| {
                let mut row = vec![period.date.format(DATE_FORMAT).to_string()];
                row.extend(self.aligned(&period.values));
                row.push(block.symbol.clone());
                row
            })
            .collect();
        OutputTable { header, rows }
    }

    // Pads or truncates values to the metric count.
    fn aligned<'a>(&'a self, values: &'a [String]) -> impl Iterator<Item = String> + 'a {
        (0..self.metrics.len()).map(move |i| values.get(i).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockrisk_data::html::HtmlTable;
    use stockrisk_data::period::DateRules;
    use stockrisk_data::stockanalysis::{MetricVocabulary, normalize_ratio_table};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn ratios(symbol: &str) -> RatioTable {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "FY 2024", "FY 2023"])],
            vec![
                s(&["Inventory Turnover", "6.1", "5.9"]),
                s(&["Current Ratio", "1.5", "-"]),
            ],
        );
        normalize_ratio_table(
            symbol,
            &table,
            &MetricVocabulary::default(),
            &DateRules::default(),
            NaiveDate::from_ymd_opt(2025, 10, 18).unwrap(),
        )
        .unwrap()
    }

    fn metrics() -> Vec<String> {
        s(&["Current Ratio", "Debt / Equity Ratio", "Inventory Turnover"])
    }

    fn scores(z: &str, f: &str) -> ScorePair {
        ScorePair {
            altman_z: z.to_string(),
            piotroski_f: f.to_string(),
        }
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("per-ticker".parse::<Layout>(), Ok(Layout::PerTicker));
        assert_eq!("Consolidated".parse::<Layout>(), Ok(Layout::Consolidated));
        assert!("sideways".parse::<Layout>().is_err());
        assert_eq!(Layout::PerTicker.to_string(), "per-ticker");
    }

    #[test]
    fn test_block_aligns_to_book_metrics() {
        let block = TickerBlock::new("AA", "Alcoa").with_ratios(&ratios("AA"), &metrics());
        assert_eq!(block.periods.len(), 2);
        assert_eq!(block.periods[0].values, s(&["1.5", "", "6.1"]));
        assert_eq!(block.periods[1].values, s(&["", "", "5.9"]));
        assert!(!block.is_placeholder());
    }

    #[test]
    fn test_consolidated_header_without_category() {
        let book = OutputBook::new(metrics())
            .with_block(TickerBlock::new("AA", "Alcoa").with_ratios(&ratios("AA"), &metrics()));
        assert_eq!(
            book.header(),
            s(&[
                "Date",
                "Current Ratio",
                "Debt / Equity Ratio",
                "Inventory Turnover",
                "Ticker",
                "Altman Z-Score",
                "Piotroski F-Score",
            ])
        );
    }

    #[test]
    fn test_consolidated_rows() {
        let book = OutputBook::new(metrics())
            .with_block(
                TickerBlock::new("AA", "Alcoa")
                    .with_category(Some("supplier".to_string()))
                    .with_scores(scores("2.07", "7"))
                    .with_ratios(&ratios("AA"), &metrics()),
            )
            .with_block(
                TickerBlock::new("ZZZZ", "Nobody")
                    .with_scores(scores("", ""))
                    .failed("HTTP 404"),
            );

        let table = book.consolidated();
        assert_eq!(table.header().last().map(String::as_str), Some("Category"));
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.rows()[0],
            s(&["2024/12/31", "1.5", "", "6.1", "AA", "2.07", "7", "supplier"])
        );
        assert_eq!(
            table.rows()[2],
            s(&["", "", "", "", "ZZZZ", "", "", ""])
        );
        assert!(table.rows().iter().all(|r| r.len() == table.header().len()));
    }

    #[test]
    fn test_consolidated_drops_upgrade_rows() {
        let mut block = TickerBlock::new("AA", "Alcoa");
        block.periods = vec![
            PeriodValues {
                date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                values: s(&["1.5", "0.4", "6.1"]),
            },
            PeriodValues {
                date: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
                values: s(&["Upgrade", "Upgrade", "Upgrade"]),
            },
        ];
        let table = OutputBook::new(metrics()).with_block(block).consolidated();
        assert_eq!(table.len(), 1);
        assert!(
            table
                .rows()
                .iter()
                .flatten()
                .all(|field| !field.contains("Upgrade"))
        );
    }

    #[test]
    fn test_locked_score_keeps_placeholder_row() {
        let mut block = TickerBlock::new("RS", "Reliance").failed("HTTP 404");
        block.scores = scores("Upgrade", "Upgrade");
        let book = OutputBook::new(metrics())
            .with_block(block)
            .with_block(
                TickerBlock::new("AA", "Alcoa")
                    .with_scores(scores("Upgrade", "7"))
                    .with_ratios(&ratios("AA"), &metrics()),
            );

        let table = book.consolidated();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], s(&["", "", "", "", "RS", "", ""]));
        assert_eq!(table.rows()[1][5], "");
        assert_eq!(table.rows()[1][6], "7");
        assert_eq!(book.blocks()[1].scores.altman_z, "");
    }

    #[test]
    fn test_fixed_columns() {
        assert!(is_fixed_column("Ticker"));
        assert!(is_fixed_column(" date "));
        assert!(is_fixed_column("altman z-score"));
        assert!(!is_fixed_column("Current Ratio"));
    }

    #[test]
    fn test_header_has_no_duplicates() {
        let book = OutputBook::new(metrics()).with_block(
            TickerBlock::new("AA", "Alcoa").with_category(Some("supplier".to_string())),
        );
        let header = book.header();
        let mut sorted = header.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), header.len());
    }

    #[test]
    fn test_ticker_table() {
        let book = OutputBook::new(metrics());
        let block = TickerBlock::new("AA", "Alcoa").with_ratios(&ratios("AA"), &metrics());
        let table = book.ticker_table(&block);
        assert_eq!(table.header()[0], "Date");
        assert_eq!(table.header().len(), 5);
        assert_eq!(table.header()[4], "Ticker");
        assert_eq!(table.rows()[1], s(&["2023/12/31", "", "", "5.9", "AA"]));

        let failed = TickerBlock::new("ZZZZ", "Nobody").failed("timeout");
        assert!(book.ticker_table(&failed).is_empty());
    }

    #[test]
    fn test_block_json_flattens_scores() {
        let block = TickerBlock::new("AA", "Alcoa").with_scores(scores("2.07", "7"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["Altman Z-Score"], "2.07");
        assert_eq!(json["Piotroski F-Score"], "7");
        assert!(json.get("category").is_none());
        assert!(json.get("failure").is_none());
    }
}
