//! Conversions between what the operator types or pastes and what is sent
//! to the API.
//!
//! The row model always stores the amount as a bare digit string; grouping
//! is applied only when the value is rendered.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Thousands separator of the display currency
const GROUP_SEPARATOR: char = '.';

/// Day-first date as typed in the grid: `DD-MM-YYYY` or `DD/MM/YYYY`
static DAY_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})[-/](\d{2})[-/](\d{4})$").expect("valid date pattern"));

/// Date-only formats accepted when the day-first pattern does not match
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%b %d, %Y", "%d %b %Y"];

/// Date-time formats (no offset, read as UTC) accepted as a fallback
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Keep ASCII digits only.
///
/// Used both for keystrokes in the amount cell and for pasted amounts, so
/// `"1,234.50 đ"` becomes `"123450"`. This is a strip, not a decimal parse.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits of an amount without leading zeros; a run of zeros stays `"0"`.
/// This is what the amount cell stores, so the stored value matches the
/// formatted one.
pub fn amount_digits(text: &str) -> String {
    let digits = digits_only(text);
    if digits.is_empty() {
        return digits;
    }
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        significant => significant.to_string(),
    }
}

/// Group a digit string by thousands: `"100000"` -> `"100.000"`.
///
/// Non-digits are ignored and leading zeros dropped; returns an empty string
/// when nothing numeric is left.
pub fn format_currency(raw: &str) -> String {
    let significant = amount_digits(raw);
    if significant.is_empty() {
        return significant;
    }

    let mut result = String::with_capacity(significant.len() + significant.len() / 3);
    for (i, c) in significant.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(GROUP_SEPARATOR);
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Result of interpreting the date cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// Cell is empty or whitespace: the date is not being changed
    Empty,
    Parsed(DateTime<Utc>),
    Unparseable,
}

impl DateInput {
    /// Value for the `paymentDate` field, `None` means the key is omitted
    pub fn wire_value(&self) -> Option<String> {
        match self {
            DateInput::Parsed(dt) => Some(to_wire_timestamp(dt)),
            DateInput::Empty | DateInput::Unparseable => None,
        }
    }
}

/// Interpret a date cell.
///
/// `DD-MM-YYYY` / `DD/MM/YYYY` is tried first and always read day-first.
/// Anything else goes through a list of common formats. Dates without a time
/// resolve to midnight UTC.
pub fn parse_payment_date(raw: &str) -> DateInput {
    let value = raw.trim();
    if value.is_empty() {
        return DateInput::Empty;
    }

    if let Some(dt) = parse_day_first(value) {
        return DateInput::Parsed(dt);
    }

    match parse_fallback(value) {
        Some(dt) => DateInput::Parsed(dt),
        None => DateInput::Unparseable,
    }
}

fn parse_day_first(value: &str) -> Option<DateTime<Utc>> {
    let caps = DAY_FIRST_DATE.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    // 31-02-2024 and the like return None here and get a second chance below
    NaiveDate::from_ymd_opt(year, month, day).map(midnight_utc)
}

fn parse_fallback(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// ISO-8601 with milliseconds and `Z`: `2024-02-01T00:00:00.000Z`
pub fn to_wire_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `DD.MM.YYYY`, shown under the date cell as a hint of how it was read
pub fn format_date_display(dt: &DateTime<Utc>) -> String {
    dt.format("%d.%m.%Y").to_string()
}
