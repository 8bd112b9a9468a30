//! Ticker universe for stockrisk.
//!
//! This module provides the list of companies to scrape and their
//! supply-chain categories.

pub mod category;
pub mod tickers;

pub use category::Category;
pub use tickers::{TickerEntry, TickerList};
