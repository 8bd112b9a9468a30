//! Altman Z-Score and Piotroski F-Score extraction from statistics pages.

use crate::error::{DataError, Result};
use crate::html::{self, HtmlTable};
use crate::stockanalysis::client::StockAnalysisClient;
use crate::stockanalysis::ratios::clean_value;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Label substring of the Altman Z-Score row.
pub const ALTMAN_Z: &str = "Altman Z";

/// Label substring of the Piotroski F-Score row.
pub const PIOTROSKI_F: &str = "Piotroski F";

/// The two risk scores of one ticker; empty strings when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    /// Altman Z-Score as shown on the page.
    #[serde(rename = "Altman Z-Score")]
    pub altman_z: String,
    /// Piotroski F-Score as shown on the page.
    #[serde(rename = "Piotroski F-Score")]
    pub piotroski_f: String,
}

impl ScorePair {
    /// Whether neither score was found.
    pub fn is_empty(&self) -> bool {
        self.altman_z.is_empty() && self.piotroski_f.is_empty()
    }
}

/// Concatenate all tables into (metric, value) pairs.
///
/// Every body row with at least two cells contributes its first two cells.
pub fn metric_pairs(tables: &[HtmlTable]) -> Vec<(String, String)> {
    tables
        .iter()
        .flat_map(HtmlTable::rows)
        .filter(|row| row.len() >= 2)
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect()
}

/// Pick the first Altman Z and Piotroski F rows out of (metric, value) pairs.
///
/// Values go through [`clean_value`], so a locked score reads as empty.
///
/// ```
/// use stockrisk_data::stockanalysis::extract_scores;
///
/// let rows = vec![
///     ("Altman Z-Score (Z)".to_string(), "2.1".to_string()),
///     ("Piotroski F-Score".to_string(), "6".to_string()),
/// ];
/// let scores = extract_scores(&rows);
/// assert_eq!(scores.altman_z, "2.1");
/// assert_eq!(scores.piotroski_f, "6");
/// ```
pub fn extract_scores(pairs: &[(String, String)]) -> ScorePair {
    let find = |needle: &str| {
        pairs
            .iter()
            .find(|(metric, _)| metric.contains(needle))
            .map(|(_, value)| clean_value(value))
            .unwrap_or_default()
    };
    ScorePair {
        altman_z: find(ALTMAN_Z),
        piotroski_f: find(PIOTROSKI_F),
    }
}

/// Fetches score pairs from statistics pages.
#[derive(Debug, Clone)]
pub struct ScoreProvider {
    client: StockAnalysisClient,
}

impl ScoreProvider {
    /// Create a provider.
    pub const fn new(client: StockAnalysisClient) -> Self {
        Self { client }
    }

    /// Fetch the score pair for `symbol`. Never fails: any error yields empty scores.
    ///
    /// `ratio_url` is the ticker's ratio page override, used to locate the
    /// matching statistics page.
    pub async fn fetch_scores(&self, symbol: &str, ratio_url: Option<&str>) -> ScorePair {
        match self.try_fetch_scores(symbol, ratio_url).await {
            Ok(scores) => {
                info!(
                    symbol,
                    altman_z = %scores.altman_z,
                    piotroski_f = %scores.piotroski_f,
                    "scores fetched"
                );
                scores
            }
            Err(e) => {
                warn!(symbol, error = %e, "score fetch failed, leaving scores empty");
                ScorePair::default()
            }
        }
    }

    async fn try_fetch_scores(&self, symbol: &str, ratio_url: Option<&str>) -> Result<ScorePair> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        let url = self.client.statistics_url(symbol, ratio_url);
        let page = self.client.fetch_page(&url).await?;
        let tables = html::parse_tables(&page);
        if tables.is_empty() {
            return Err(DataError::NoTable(url));
        }
        Ok(extract_scores(&metric_pairs(&tables)))
    }
}
