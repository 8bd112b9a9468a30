//! HTTP client for stockanalysis.com pages with a fixed retry loop.

use crate::error::{DataError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://stockanalysis.com";

/// Browser-like user agent; the site rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Path suffix of a ratio page, relative to a company root.
const RATIOS_SUFFIX: &str = "financials/ratios/";

/// Path suffix of a statistics page, relative to a company root.
const STATISTICS_SUFFIX: &str = "statistics/";

/// Request and retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Requests per URL before giving up (at least one).
    pub attempts: u32,
    /// Fixed pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            attempts: 3,
            retry_delay_ms: 2000,
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchSettings {
    /// Pause between attempts.
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// stockanalysis.com page client.
#[derive(Clone)]
pub struct StockAnalysisClient {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl StockAnalysisClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_settings(FetchSettings::default())
    }

    /// Create a client with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client, settings })
    }

    /// Conventional ratio page URL for a symbol.
    pub fn ratios_url(&self, symbol: &str) -> String {
        format!("{}{}", self.company_root(symbol), RATIOS_SUFFIX)
    }

    /// Statistics page URL for a symbol.
    ///
    /// When the ticker has a ratio URL override ending in `financials/ratios/`,
    /// the statistics page is derived from the same company root.
    pub fn statistics_url(&self, symbol: &str, ratio_override: Option<&str>) -> String {
        if let Some(root) = ratio_override.and_then(|url| {
            let trimmed = url.trim_end_matches('/');
            trimmed.strip_suffix(RATIOS_SUFFIX.trim_end_matches('/'))
        }) {
            return format!("{root}{STATISTICS_SUFFIX}");
        }
        format!("{}{}", self.company_root(symbol), STATISTICS_SUFFIX)
    }

    fn company_root(&self, symbol: &str) -> String {
        format!(
            "{}/stocks/{}/",
            self.settings.base_url.trim_end_matches('/'),
            symbol.trim().to_lowercase()
        )
    }

    /// Fetch a page, retrying a fixed number of times with a fixed pause.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let attempts = self.settings.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!(url, attempt, attempts, error = %e, "request failed");
                    last_error = Some(e);
                }
            }
            if attempt < attempts {
                sleep(self.settings.retry_delay()).await;
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Unreachable {
            url: url.to_string(),
            attempts,
        }))
    }

    /// Fetch a page, then its [`fallback_url`] when the first URL keeps failing.
    pub async fn fetch_with_fallback(&self, url: &str) -> Result<String> {
        let first = match self.fetch_page(url).await {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };

        let Some(fallback) = fallback_url(url) else {
            return Err(first);
        };
        warn!(url, fallback = %fallback, error = %first, "primary URL failed, trying fallback");

        match self.fetch_page(&fallback).await {
            Ok(body) => Ok(body),
            Err(e) => {
                warn!(url = %fallback, error = %e, "fallback URL failed");
                Err(DataError::Unreachable {
                    url: fallback,
                    attempts: self.settings.attempts.max(1) * 2,
                })
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(DataError::Network)
    }
}

impl std::fmt::Debug for StockAnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockAnalysisClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// The URL with its final path segment dropped, keeping a trailing slash.
///
/// Returns `None` when the path has fewer than two segments.
///
/// ```
/// use stockrisk_data::stockanalysis::fallback_url;
///
/// assert_eq!(
///     fallback_url("https://stockanalysis.com/stocks/aa/financials/ratios/").as_deref(),
///     Some("https://stockanalysis.com/stocks/aa/financials/")
/// );
/// ```
pub fn fallback_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let segments: Vec<String> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.len() < 2 {
        return None;
    }
    let path = format!("/{}/", segments[..segments.len() - 1].join("/"));
    parsed.set_path(&path);
    Some(parsed.to_string())
}
