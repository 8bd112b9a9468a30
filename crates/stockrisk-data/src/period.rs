//! Reporting-period label normalization.
//!
//! Ratio tables label their columns with strings such as `FY 2024 Dec 31, 2024`,
//! `Current`, `TTM` or `Oct '25`. [`normalize_period`] turns one label into a
//! [`Period`] using a fixed precedence:
//!
//! 1. strip `(`, `)`, `'` and `"` characters and trim;
//! 2. a full month/day/year date (`Dec 31, 2024`, `December 31 2024`,
//!    `12/31/2024`, `2024-12-31`, `2024/12/31`) gives that date;
//! 3. a bare four-digit year gives December 31 of that year;
//! 4. a word equal to one of the configured today markers (`Current`,
//!    `TTM`, month abbreviations, ...) gives `today`; a month marker also
//!    matches the month's full name;
//! 5. anything else is [`Period::Unknown`].

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Output format of normalized dates.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("valid regex")
});

static NUMERIC_MDY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"));

static NUMERIC_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("valid regex"));

static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Years accepted as a bare fiscal year.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// A normalized reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Period {
    /// A resolved calendar date.
    Date(NaiveDate),
    /// A label no rule could classify; keeps the cleaned label.
    Unknown(String),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Unknown(label) => write!(f, "unknown({label})"),
        }
    }
}

/// Lookup table for labels that mean "the latest period".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRules {
    /// Case-insensitive words that map a label to today's date.
    pub today_markers: Vec<String>,
}

impl Default for DateRules {
    fn default() -> Self {
        let markers = [
            "Current", "TTM", "LTM", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug",
            "Sep", "Oct", "Nov", "Dec",
        ];
        Self {
            today_markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl DateRules {
    /// Whether any word of `label` is a today marker.
    ///
    /// A month marker such as `Oct` also matches `October`.
    pub fn mentions_today(&self, label: &str) -> bool {
        label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| {
                let month = month_number(word);
                self.today_markers
                    .iter()
                    .filter(|m| !m.is_empty())
                    .any(|m| {
                        word.eq_ignore_ascii_case(m)
                            || (month.is_some() && month == month_number(m))
                    })
            })
    }
}

/// Remove quoting and parenthesis characters from a period label.
pub fn clean_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '\'' | '"'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a period label. See the module docs for the precedence order.
///
/// ```
/// use chrono::NaiveDate;
/// use stockrisk_data::period::{DateRules, Period, normalize_period};
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let rules = DateRules::default();
/// assert_eq!(
///     normalize_period("FY 2023", today, &rules),
///     Period::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
/// );
/// assert_eq!(normalize_period("TTM", today, &rules), Period::Date(today));
/// ```
pub fn normalize_period(label: &str, today: NaiveDate, rules: &DateRules) -> Period {
    let cleaned = clean_label(label);

    if let Some(date) = full_date(&cleaned) {
        return Period::Date(date);
    }
    if let Some(date) = bare_year(&cleaned) {
        return Period::Date(date);
    }
    if rules.mentions_today(&cleaned) {
        return Period::Date(today);
    }
    Period::Unknown(cleaned)
}

fn full_date(label: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_DAY_YEAR.captures(label) {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }
    if let Some(caps) = NUMERIC_YMD.captures(label) {
        let (y, m, d) = (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }
    if let Some(caps) = NUMERIC_MDY.captures(label) {
        let (m, d, y) = (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }
    None
}

fn bare_year(label: &str) -> Option<NaiveDate> {
    BARE_YEAR
        .captures_iter(label)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .find(|year| YEAR_RANGE.contains(year))
        .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31))
}

// Full month name or its three-letter abbreviation (`sept` as well).
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|full| {
            name == *full || name == full[..3] || (name == "sept" && *full == "september")
        })
        .and_then(|i| u32::try_from(i + 1).ok())
}
