//! Ratio-table fetch and normalization.
//!
//! A ratio page lists metrics as rows and reporting periods as columns. The
//! normalization turns that into one row per reporting period with one column
//! per target metric:
//!
//! 1. flatten the header ([`HtmlTable::columns`]);
//! 2. keep rows whose first cell matches the [`MetricVocabulary`] and rename
//!    them to their canonical name;
//! 3. transpose, normalizing each former column header with
//!    [`normalize_period`];
//! 4. collapse duplicate metrics and duplicate periods (first one wins) and
//!    blank out placeholder values.

use crate::error::{DataError, Result};
use crate::html::{self, HtmlTable};
use crate::period::{DateRules, Period, normalize_period};
use crate::stockanalysis::client::StockAnalysisClient;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Cell values treated as "no data".
pub const PLACEHOLDERS: &[&str] = &["-", "—", "–", "n/a", "nan", "none", "null"];

/// Marketing text shown instead of values for locked periods.
pub const UPGRADE_MARKER: &str = "Upgrade";

/// One vocabulary entry: a label substring and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRule {
    /// Case-insensitive substring matched against the metric label.
    pub pattern: String,
    /// Output column name.
    pub canonical: String,
}

impl MetricRule {
    /// Create a rule.
    pub fn new(pattern: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            canonical: canonical.into(),
        }
    }
}

/// Ordered set of target metrics. Earlier rules take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVocabulary {
    rules: Vec<MetricRule>,
}

impl MetricVocabulary {
    /// Create a vocabulary from rules.
    pub const fn new(rules: Vec<MetricRule>) -> Self {
        Self { rules }
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> &[MetricRule] {
        &self.rules
    }

    /// Canonical name for a metric label, if any rule matches.
    pub fn canonical(&self, label: &str) -> Option<&str> {
        let label = label.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| !rule.pattern.is_empty())
            .find(|rule| label.contains(&rule.pattern.to_lowercase()))
            .map(|rule| rule.canonical.as_str())
    }

    /// Distinct canonical names in rule order; this is the output column order.
    pub fn canonical_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .filter(|rule| seen.insert(rule.canonical.as_str()))
            .map(|rule| rule.canonical.clone())
            .collect()
    }
}

impl Default for MetricVocabulary {
    fn default() -> Self {
        Self::new(vec![
            MetricRule::new("Current Ratio", "Current Ratio"),
            MetricRule::new("Debt", "Debt / Equity Ratio"),
            MetricRule::new("EBITDA", "EBITDA"),
            MetricRule::new("Free Cash Flow", "Free Cash Flow (Millions)"),
            MetricRule::new("Inventory Turnover", "Inventory Turnover"),
            MetricRule::new("Net Income", "Net Income (Millions)"),
        ])
    }
}

/// One reporting period of a ratio table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioRow {
    /// Normalized period date.
    pub date: NaiveDate,
    /// Column header the period came from.
    pub label: String,
    /// Values aligned with [`RatioTable::metrics`]; empty when missing.
    pub values: Vec<String>,
}

/// Reporting periods × target metrics for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioTable {
    symbol: String,
    metrics: Vec<String>,
    rows: Vec<RatioRow>,
}

impl RatioTable {
    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Canonical metric names present in the source table, in page order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// One row per distinct period.
    pub fn rows(&self) -> &[RatioRow] {
        &self.rows
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no periods.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `metric` in `row`, or `""` when the source had no such metric.
    pub fn value<'a>(&self, row: &'a RatioRow, metric: &str) -> &'a str {
        self.metrics
            .iter()
            .position(|m| m == metric)
            .and_then(|i| row.values.get(i))
            .map_or("", String::as_str)
    }
}

/// Blank out placeholder cell values.
pub fn clean_value(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty()
        || value.contains(UPGRADE_MARKER)
        || PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p))
    {
        String::new()
    } else {
        value.to_string()
    }
}

/// Normalize a scraped ratio table.
///
/// # Errors
/// Returns [`DataError::Parse`] when the table has no period columns, and
/// [`DataError::MissingData`] when no row matches the vocabulary or no
/// period label can be classified.
pub fn normalize_ratio_table(
    symbol: &str,
    table: &HtmlTable,
    vocabulary: &MetricVocabulary,
    rules: &DateRules,
    today: NaiveDate,
) -> Result<RatioTable> {
    let missing = |reason: &str| DataError::MissingData {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    };

    let columns = table.columns();
    if columns.len() < 2 {
        return Err(DataError::Parse(format!(
            "ratio table for {symbol} has {} column(s), expected a metric column and periods",
            columns.len()
        )));
    }

    // Metric rows, duplicates collapsed to the first occurrence.
    let mut metrics: Vec<String> = Vec::new();
    let mut source_rows: Vec<&[String]> = Vec::new();
    for row in table.rows() {
        let Some(canonical) = vocabulary.canonical(&row[0]) else {
            continue;
        };
        if metrics.iter().any(|m| m == canonical) {
            debug!(symbol, label = %row[0], canonical, "duplicate metric, keeping first");
            continue;
        }
        metrics.push(canonical.to_string());
        source_rows.push(row);
    }
    if metrics.is_empty() {
        return Err(missing("no target metrics in ratio table"));
    }

    // Transpose: every period column becomes a row.
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (col, label) in columns.iter().enumerate().skip(1) {
        let date = match normalize_period(label, today, rules) {
            Period::Date(date) => date,
            Period::Unknown(cleaned) => {
                warn!(symbol, label = %cleaned, "unrecognized period label, dropping column");
                continue;
            }
        };
        if !seen.insert(date) {
            debug!(symbol, label = %label, %date, "duplicate period, keeping first");
            continue;
        }
        rows.push(RatioRow {
            date,
            label: label.clone(),
            values: source_rows.iter().map(|r| clean_value(&r[col])).collect(),
        });
    }
    if rows.is_empty() {
        return Err(missing("no recognizable reporting periods"));
    }

    Ok(RatioTable {
        symbol: symbol.to_string(),
        metrics,
        rows,
    })
}

/// Fetches and normalizes ratio pages.
#[derive(Debug, Clone)]
pub struct RatioProvider {
    client: StockAnalysisClient,
    vocabulary: MetricVocabulary,
    rules: DateRules,
}

impl RatioProvider {
    /// Create a provider.
    pub const fn new(
        client: StockAnalysisClient,
        vocabulary: MetricVocabulary,
        rules: DateRules,
    ) -> Self {
        Self {
            client,
            vocabulary,
            rules,
        }
    }

    /// Fetch the ratio table for `symbol`, dating "current" periods today.
    pub async fn fetch_ratios(&self, symbol: &str, url: Option<&str>) -> Result<RatioTable> {
        self.fetch_ratios_as_of(symbol, url, Local::now().date_naive())
            .await
    }

    /// Fetch the ratio table for `symbol` with an explicit "today".
    ///
    /// `url` overrides the conventional ratio page. When the page keeps
    /// failing, the URL with its last path segment dropped is tried once more.
    pub async fn fetch_ratios_as_of(
        &self,
        symbol: &str,
        url: Option<&str>,
        today: NaiveDate,
    ) -> Result<RatioTable> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = url.map_or_else(|| self.client.ratios_url(symbol), str::to_string);
        let page = self.client.fetch_with_fallback(&url).await?;
        let table = html::first_table(&page).ok_or_else(|| DataError::NoTable(url.clone()))?;

        let ratios = normalize_ratio_table(symbol, &table, &self.vocabulary, &self.rules, today)?;
        info!(
            symbol,
            periods = ratios.len(),
            metrics = ratios.metrics().len(),
            "ratio table normalized"
        );
        Ok(ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 10, 18)
    }

    fn normalize(table: &HtmlTable) -> Result<RatioTable> {
        normalize_ratio_table(
            "AA",
            table,
            &MetricVocabulary::default(),
            &DateRules::default(),
            today(),
        )
    }

    #[test]
    fn test_vocabulary_canonical() {
        let vocab = MetricVocabulary::default();
        assert_eq!(vocab.canonical("current ratio"), Some("Current Ratio"));
        assert_eq!(vocab.canonical("Debt / Equity Ratio"), Some("Debt / Equity Ratio"));
        assert_eq!(vocab.canonical("EBITDA Margin"), Some("EBITDA"));
        assert_eq!(vocab.canonical("Net Income Growth"), Some("Net Income (Millions)"));
        assert_eq!(vocab.canonical("PE Ratio"), None);
    }

    #[test]
    fn test_vocabulary_precedence() {
        // "Debt / EBITDA" matches both "Debt" and "EBITDA"; the earlier rule wins.
        let vocab = MetricVocabulary::default();
        assert_eq!(vocab.canonical("Debt / EBITDA Ratio"), Some("Debt / Equity Ratio"));
    }

    #[test]
    fn test_canonical_names_are_distinct() {
        let vocab = MetricVocabulary::new(vec![
            MetricRule::new("Debt / Equity", "Debt / Equity Ratio"),
            MetricRule::new("Debt-to-Equity", "Debt / Equity Ratio"),
            MetricRule::new("EBITDA", "EBITDA"),
        ]);
        assert_eq!(vocab.canonical_names(), vec!["Debt / Equity Ratio", "EBITDA"]);
    }

    #[test]
    fn test_vocabulary_json_is_a_list() {
        let json = serde_json::to_string(&MetricVocabulary::new(vec![MetricRule::new(
            "EBITDA", "EBITDA",
        )]))
        .unwrap();
        assert_eq!(json, r#"[{"pattern":"EBITDA","canonical":"EBITDA"}]"#);
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value(" 1.52 "), "1.52");
        assert_eq!(clean_value("-"), "");
        assert_eq!(clean_value("—"), "");
        assert_eq!(clean_value("Upgrade"), "");
        assert_eq!(clean_value("NaN"), "");
        assert_eq!(clean_value("None"), "");
        assert_eq!(clean_value("   "), "");
        assert_eq!(clean_value("-12.5%"), "-12.5%");
    }

    #[test]
    fn test_normalize_transposes() {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "FY 2024", "FY 2023", "FY 2022"])],
            vec![
                s(&["Market Capitalization", "10", "9", "8"]),
                s(&["Current Ratio", "1.5", "1.4", "-"]),
                s(&["EBITDA", "1,200", "Upgrade", "900"]),
            ],
        );
        let ratios = normalize(&table).unwrap();
        assert_eq!(ratios.symbol(), "AA");
        assert_eq!(ratios.metrics(), &s(&["Current Ratio", "EBITDA"]));
        assert_eq!(ratios.len(), 3);

        let first = &ratios.rows()[0];
        assert_eq!(first.date, ymd(2024, 12, 31));
        assert_eq!(first.label, "FY 2024");
        assert_eq!(ratios.value(first, "Current Ratio"), "1.5");
        assert_eq!(ratios.value(first, "EBITDA"), "1,200");
        assert_eq!(ratios.value(first, "Inventory Turnover"), "");

        assert_eq!(ratios.value(&ratios.rows()[1], "EBITDA"), "");
        assert_eq!(ratios.value(&ratios.rows()[2], "Current Ratio"), "");
    }

    #[test]
    fn test_duplicate_metric_keeps_first() {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "FY 2024"])],
            vec![
                s(&["Debt / Equity Ratio", "0.45"]),
                s(&["Debt / EBITDA Ratio", "2.10"]),
            ],
        );
        let ratios = normalize(&table).unwrap();
        assert_eq!(ratios.metrics(), &s(&["Debt / Equity Ratio"]));
        assert_eq!(ratios.value(&ratios.rows()[0], "Debt / Equity Ratio"), "0.45");
    }

    #[test]
    fn test_duplicate_period_keeps_first() {
        // "Current" and "TTM" both resolve to today; the TTM column is discarded.
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "Current", "TTM", "FY 2024"])],
            vec![s(&["Current Ratio", "1.9", "1.8", "1.7"])],
        );
        let ratios = normalize(&table).unwrap();
        assert_eq!(ratios.len(), 2);
        assert_eq!(ratios.rows()[0].date, today());
        assert_eq!(ratios.value(&ratios.rows()[0], "Current Ratio"), "1.9");
        assert_eq!(ratios.rows()[1].date, ymd(2024, 12, 31));
    }

    #[test]
    fn test_two_level_header_keeps_distinct_periods() {
        let table = HtmlTable::new(
            vec![
                s(&["Fiscal Year", "FY 2024", "FY 2023"]),
                s(&["Period Ending", "Dec 31, 2024", "Dec 31, 2023"]),
            ],
            vec![s(&["Inventory Turnover", "6.1", "5.9"])],
        );
        let ratios = normalize(&table).unwrap();
        let dates: Vec<_> = ratios.rows().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2024, 12, 31), ymd(2023, 12, 31)]);
        assert_eq!(ratios.rows()[0].label, "FY 2024 Dec 31, 2024");
    }

    #[test]
    fn test_unknown_period_is_dropped() {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "FY 2024", "Upgrade"])],
            vec![s(&["Current Ratio", "1.5", "Upgrade"])],
        );
        let ratios = normalize(&table).unwrap();
        assert_eq!(ratios.len(), 1);
        assert!(
            ratios
                .rows()
                .iter()
                .all(|r| r.values.iter().all(|v| !v.contains(UPGRADE_MARKER)))
        );
    }

    #[test]
    fn test_no_target_metrics() {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "FY 2024"])],
            vec![s(&["PE Ratio", "12"])],
        );
        assert!(matches!(
            normalize(&table),
            Err(DataError::MissingData { .. })
        ));
    }

    #[test]
    fn test_single_column_table() {
        let table = HtmlTable::new(vec![s(&["Metric"])], vec![s(&["Current Ratio"])]);
        assert!(matches!(normalize(&table), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_no_recognizable_periods() {
        let table = HtmlTable::new(
            vec![s(&["Fiscal Year", "Upgrade", "Period"])],
            vec![s(&["Current Ratio", "1", "2"])],
        );
        let err = normalize(&table).unwrap_err();
        assert!(err.to_string().contains("no recognizable reporting periods"));
    }
}
