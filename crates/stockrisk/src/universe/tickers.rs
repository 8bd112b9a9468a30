//! Ticker list with display names, URL overrides and categories.

use crate::universe::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One company to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Stock symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Ratio page URL, when the conventional one does not apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Supply-chain category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TickerEntry {
    /// Create a new entry.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            url: None,
            category: None,
        }
    }

    /// Set the ratio page URL override.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the category.
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

/// Ordered list of tickers; the run processes them in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerList {
    entries: Vec<TickerEntry>,
}

impl TickerList {
    /// Create a list from entries.
    pub const fn new(entries: Vec<TickerEntry>) -> Self {
        Self { entries }
    }

    /// Get all entries.
    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    /// Get all symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    /// Find an entry by symbol, ignoring case.
    pub fn get(&self, symbol: &str) -> Option<&TickerEntry> {
        self.entries
            .iter()
            .find(|e| e.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Get all entries in a category.
    pub fn in_category(&self, category: Category) -> Vec<&TickerEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == Some(category))
            .collect()
    }

    /// Get the count of entries per category.
    pub fn category_counts(&self) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for category in self.entries.iter().filter_map(|e| e.category) {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The aluminum-sector companies tracked out of the box.
    fn default_entries() -> Vec<TickerEntry> {
        vec![
            TickerEntry::new("AA", "Alcoa").with_category(Category::Supplier),
            TickerEntry::new("RIO", "Rio Tinto").with_category(Category::Supplier),
            TickerEntry::new("NHYDY", "Norsk Hydro")
                .with_url("https://stockanalysis.com/quote/otc/NHYDY/financials/ratios/")
                .with_category(Category::Supplier),
            TickerEntry::new("RS", "Reliance Steel & Aluminum")
                .with_category(Category::Distributor),
            TickerEntry::new("KALU", "Kaiser Aluminum").with_category(Category::Mills),
            TickerEntry::new("RYI", "Ryerson Holding").with_category(Category::Distributor),
        ]
    }
}

impl Default for TickerList {
    fn default() -> Self {
        Self::new(Self::default_entries())
    }
}

impl FromIterator<TickerEntry> for TickerList {
    fn from_iter<I: IntoIterator<Item = TickerEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
