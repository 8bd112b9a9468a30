//! Supply-chain categories used to group tickers in the output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a company in the aluminum supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Rolling mills and fabricators
    Mills,

    /// Metals service centers and distributors
    Distributor,

    /// Primary producers and raw material suppliers
    Supplier,
}

impl Category {
    /// Returns all categories.
    pub fn all() -> Vec<Self> {
        vec![Self::Mills, Self::Distributor, Self::Supplier]
    }

    /// Returns the name written to the Category column.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mills => "mills",
            Self::Distributor => "distributor",
            Self::Supplier => "supplier",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
