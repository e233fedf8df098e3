//! Date expressions in free-text commands.
//!
//! Rules are tried in order and the first that matches wins:
//! an inclusive `from D-M-YYYY to D-M-YYYY` range, a single `D-M-YYYY`
//! date, the words `today` or `yesterday`, and finally today. Either `-` or
//! `/` separates the date parts.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// Longest range a single command may expand to.
pub const MAX_RANGE_DAYS: i64 = 366;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"from\s+(\d{1,2})[-/](\d{1,2})[-/](\d{4})\s+to\s+(\d{1,2})[-/](\d{1,2})[-/](\d{4})",
    )
    .expect("range regex")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[-/](\d{1,2})[-/](\d{4})").expect("date regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("{day}-{month}-{year} is not a valid calendar date")]
    InvalidDate { day: u32, month: u32, year: i32 },

    #[error("the range ends on {end} before it starts on {start}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    #[error("the range covers {days} days; at most {} are allowed", MAX_RANGE_DAYS)]
    RangeTooLong { days: i64 },
}

/// Resolves the dates a command refers to, relative to `today`.
pub fn parse_dates(text: &str, today: NaiveDate) -> Result<Vec<NaiveDate>, DateParseError> {
    let text = text.to_lowercase();

    if let Some(caps) = RANGE_RE.captures(&text) {
        let start = date_from(&caps, 1)?;
        let end = date_from(&caps, 4)?;
        return expand_range(start, end);
    }

    if let Some(caps) = DATE_RE.captures(&text) {
        return Ok(vec![date_from(&caps, 1)?]);
    }

    if text.contains("today") {
        return Ok(vec![today]);
    }
    if text.contains("yesterday") {
        return Ok(vec![today - Duration::days(1)]);
    }

    Ok(vec![today])
}

fn expand_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, DateParseError> {
    if end < start {
        return Err(DateParseError::ReversedRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(DateParseError::RangeTooLong { days });
    }
    Ok(start.iter_days().take(days as usize).collect())
}

/// Reads day, month and year from three consecutive capture groups.
fn date_from(caps: &Captures<'_>, first: usize) -> Result<NaiveDate, DateParseError> {
    let number = |i: usize| caps.get(first + i).map(|m| m.as_str()).unwrap_or("0");
    // The groups are 1-4 ASCII digits, so these parses cannot overflow.
    let day: u32 = number(0).parse().unwrap_or(0);
    let month: u32 = number(1).parse().unwrap_or(0);
    let year: i32 = number(2).parse().unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::InvalidDate { day, month, year })
}
