#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockrisk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod html;
pub mod period;
pub mod stockanalysis;

pub use error::{DataError, Result};
pub use period::{DateRules, Period};
pub use stockanalysis::{
    FetchSettings, MetricRule, MetricVocabulary, RatioProvider, RatioRow, RatioTable, ScorePair,
    ScoreProvider, StockAnalysisClient,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
