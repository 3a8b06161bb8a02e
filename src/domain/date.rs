//! Calendar date parsing and rendering.
//!
//! Requests may carry dates in any of the common textual forms; responses
//! always render them as `Sun Jan 15 2023`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};

use crate::error::ValidationError;

/// Format used for every date in a response body.
pub const DISPLAY_FORMAT: &str = "%a %b %d %Y";

/// Day-granularity formats tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    DISPLAY_FORMAT,
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Timestamp formats without an offset; the time of day is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Render a date the way responses expose it, e.g. `Mon Jan 01 2024`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse a user-supplied date string.
///
/// Timestamps carrying an offset are converted to UTC before the calendar
/// date is taken. A leading weekday name that disagrees with the date is
/// ignored rather than rejected.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] if no known format matches.
pub fn parse_date(field: &'static str, input: &str) -> Result<NaiveDate, ValidationError> {
    let value = input.trim();

    parse_known_format(value)
        .or_else(|| {
            // "Tue Jan 15 2023": retry without the weekday
            let (weekday, rest) = value.split_once(' ')?;
            is_weekday(weekday).then(|| parse_known_format(rest.trim_start()))?
        })
        .ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: input.to_string(),
        })
}

fn is_weekday(token: &str) -> bool {
    let token = token.strip_suffix(',').unwrap_or(token);
    token.len() == 3 && token.parse::<Weekday>().is_ok()
}

fn parse_known_format(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_partial(value) {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc2822(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|timestamp| timestamp.date())
        })
}

/// `YYYY` and `YYYY-MM`, resolved to the first day of the period.
fn parse_partial(value: &str) -> Option<NaiveDate> {
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match value.split_once('-') {
        None if value.len() == 4 && is_digits(value) => {
            NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1)
        }
        Some((year, month))
            if year.len() == 4 && is_digits(year) && (1..=2).contains(&month.len()) && is_digits(month) =>
        {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        _ => None,
    }
}
