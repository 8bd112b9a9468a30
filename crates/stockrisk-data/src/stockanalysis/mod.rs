//! stockanalysis.com ratio and statistics pages.
//!
//! This module provides:
//! - a page client with a fixed retry loop and a fallback URL
//! - ratio-table normalization into one row per reporting period
//! - Altman Z-Score / Piotroski F-Score extraction
//!
//! # Example
//!
//! ```no_run
//! use stockrisk_data::period::DateRules;
//! use stockrisk_data::stockanalysis::{
//!     MetricVocabulary, RatioProvider, ScoreProvider, StockAnalysisClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StockAnalysisClient::new()?;
//!
//!     let ratios = RatioProvider::new(
//!         client.clone(),
//!         MetricVocabulary::default(),
//!         DateRules::default(),
//!     );
//!     let table = ratios.fetch_ratios("AA", None).await?;
//!     println!("{} periods of {:?}", table.len(), table.metrics());
//!
//!     let scores = ScoreProvider::new(client).fetch_scores("AA", None).await;
//!     println!("Altman Z: {}, Piotroski F: {}", scores.altman_z, scores.piotroski_f);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod ratios;
pub mod scores;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FetchSettings, StockAnalysisClient, fallback_url,
};
pub use ratios::{
    MetricRule, MetricVocabulary, PLACEHOLDERS, RatioProvider, RatioRow, RatioTable,
    UPGRADE_MARKER, clean_value, normalize_ratio_table,
};
pub use scores::{ScorePair, ScoreProvider, extract_scores, metric_pairs};
