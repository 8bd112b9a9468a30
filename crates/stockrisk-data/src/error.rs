//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching or normalizing scraped pages.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error (connection failure, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Every URL tried for a page failed.
    #[error("Unreachable after {attempts} attempts: {url}")]
    Unreachable {
        /// Last URL that was tried
        url: String,
        /// Total number of requests made
        attempts: u32,
    },

    /// The page did not contain any table.
    #[error("No table found for {0}")]
    NoTable(String),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Table with an unexpected shape
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

impl DataError {
    /// Whether the error came from the transport layer rather than page content.
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::Unreachable { .. }
        )
    }
}
