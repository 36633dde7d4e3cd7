//! Cell-level coercions shared by the parsers.
//!
//! Every coercion is "absent on failure": an empty, placeholder, or
//! unparseable cell yields `None`, never zero and never an error.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Cell values that mean "no value" in the exports we receive.
const NULL_MARKERS: &[&str] = &["", "-", "--", "n/a", "na", "null", "none"];

/// Locale-tolerant affirmative set used by send flags.
const YES_VALUES: &[&str] = &["sim", "yes", "s", "y", "1", "true"];

/// Date-only formats, day-first. `%d/%m/%Y` and ISO are tried first.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// `true` iff the trimmed, lower-cased value is one of
/// `sim`, `yes`, `s`, `y`, `1`, `true`.
#[must_use]
pub fn is_yes(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    YES_VALUES.contains(&lowered.as_str())
}

/// Whether a cell holds one of the "no value" placeholders.
#[must_use]
pub fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value.trim().to_lowercase().as_str())
}

/// Trimmed text, or `None` for empty and placeholder cells.
#[must_use]
pub fn non_empty(value: &str) -> Option<String> {
    if is_null_marker(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Parses `DD/MM/YYYY`, `YYYY-MM-DD`, and a handful of common calendar
/// formats. Dates outside 1900..=2100 are treated as misparses.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if is_null_marker(value) {
        return None;
    }

    let plausible = |d: NaiveDate| (1900..=2100).contains(&d.year());

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if plausible(date) {
                return Some(date);
            }
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            if plausible(dt.date()) {
                return Some(dt.date());
            }
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
        .filter(|d| plausible(*d))
}

/// [`parse_date`] rendered as an ISO `YYYY-MM-DD` string.
#[must_use]
pub fn normalize_date(value: &str) -> Option<String> {
    parse_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parses a non-negative or negative whole count. `"4.0"` is accepted;
/// `"4.5"`, text, and placeholders are not.
#[must_use]
pub fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    if is_null_marker(value) {
        return None;
    }
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        #[allow(clippy::cast_possible_truncation)]
        let n = f as i64;
        Some(n)
    } else {
        None
    }
}

/// Parses a money cell permissively: `R$ 1.500,00`, `1500.00`, `1,500.50`,
/// `1500`. The rightmost of `,`/`.` is the decimal separator when both
/// appear; a lone `,` is a decimal comma unless it groups exactly three
/// trailing digits.
#[must_use]
pub fn parse_amount(value: &str) -> Option<Decimal> {
    if is_null_marker(value) {
        return None;
    }

    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let decimals = cleaned.len() - c - 1;
            if decimals == 3 && !cleaned.starts_with(',') {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (None, Some(d)) => {
            let decimals = cleaned.len() - d - 1;
            if cleaned.matches('.').count() > 1 || decimals == 3 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
#[path = "parse_helpers_test.rs"]
mod tests;
