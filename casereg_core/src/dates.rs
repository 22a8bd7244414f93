//! Day.month.year dates embedded in free text.
//!
//! Registry fields are typed by hand, so a "date" column may hold
//! `з 01.02.2024 по 01.08.2024`, a bare `01.02.2024`, or nothing useful at
//! all. Extraction never fails loudly: a miss means the rule reading the
//! field does not apply to that record.

use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::value::Value;

/// Display and input format for dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[expect(clippy::expect_used, reason = "literal pattern, checked by the tests below")]
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{2}\.[0-9]{2}\.[0-9]{4}").expect("date pattern is valid"));

/// Which embedded date a rule consumes when a field holds several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePick {
    /// Start dates: the first `dd.mm.yyyy` found.
    First,
    /// End dates ("valid until"): the last `dd.mm.yyyy` found.
    Last,
}

impl DatePick {
    /// Extract a date from a cell value.
    ///
    /// Date-typed values are returned as-is; anything else is searched
    /// through its textual rendering.
    #[must_use]
    pub fn extract(self, value: &Value) -> Option<NaiveDate> {
        match value {
            Value::Date(date) => Some(*date),
            Value::Null => None,
            Value::Text(text) => self.extract_text(text),
            other => self.extract_text(&other.render()),
        }
    }

    /// Extract a date from text.
    ///
    /// Only the chosen pattern occurrence is parsed; if it is not a real
    /// calendar date (e.g. `31.02.2024`) the result is `None` rather than a
    /// fallback to another occurrence.
    #[must_use]
    pub fn extract_text(self, text: &str) -> Option<NaiveDate> {
        let found = match self {
            Self::First => DATE_PATTERN.find(text),
            Self::Last => DATE_PATTERN.find_iter(text).last(),
        }?;
        NaiveDate::parse_from_str(found.as_str(), DATE_FORMAT).ok()
    }
}

/// First embedded date of a text.
#[must_use]
pub fn first_date(text: &str) -> Option<NaiveDate> {
    DatePick::First.extract_text(text)
}

/// Last embedded date of a text.
#[must_use]
pub fn last_date(text: &str) -> Option<NaiveDate> {
    DatePick::Last.extract_text(text)
}

/// Every valid embedded date, in order of appearance.
#[must_use]
pub fn all_dates(text: &str) -> Vec<NaiveDate> {
    DATE_PATTERN
        .find_iter(text)
        .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT).ok())
        .collect()
}

/// Parse user input in `dd.mm.yyyy` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Calendar-month addition; the day is clamped to the end of shorter months.
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Signed number of days from `from` to `to`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_first_and_last_pick_different_occurrences() {
        let text = "домашній арешт з 01.02.2024 по 01.08.2024";
        assert_eq!(first_date(text), Some(date(2024, 2, 1)));
        assert_eq!(last_date(text), Some(date(2024, 8, 1)));
    }

    #[test]
    fn test_single_date_is_both_first_and_last() {
        assert_eq!(first_date("15.03.2025"), last_date("15.03.2025"));
    }

    #[test]
    fn test_no_date_is_a_miss() {
        assert_eq!(first_date("тримання під вартою"), None);
        assert_eq!(last_date(""), None);
        assert!(all_dates("n/a").is_empty());
    }

    #[test]
    fn test_only_ascii_digits_form_dates() {
        assert_eq!(first_date("٠١.٠٢.٢٠٢٤"), None);
        assert_eq!(first_date("٠١.٠٢.٢٠٢٤ або 01.02.2024"), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_invalid_calendar_date_does_not_fall_through() {
        // The first occurrence is not a real date; the second is never tried.
        assert_eq!(first_date("31.02.2024, 01.03.2024"), None);
        assert_eq!(all_dates("31.02.2024, 01.03.2024"), vec![date(2024, 3, 1)]);
    }

    #[test]
    fn test_extract_from_values() {
        let typed = Value::Date(date(2020, 1, 1));
        assert_eq!(DatePick::Last.extract(&typed), Some(date(2020, 1, 1)));
        assert_eq!(DatePick::First.extract(&Value::Null), None);
        assert_eq!(DatePick::First.extract(&Value::Number(12.0)), None);
    }

    #[test]
    fn test_parse_date_reports_input() {
        assert_eq!(parse_date(" 05.06.2023 "), Ok(date(2023, 6, 5)));
        assert_eq!(
            parse_date("2023-06-05"),
            Err(ValidationError::InvalidDate("2023-06-05".to_string()))
        );
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 8, 31), 6), Some(date(2025, 2, 28)));
        assert_eq!(add_months(date(2024, 1, 15), 6), Some(date(2024, 7, 15)));
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 1, 11)), 10);
        assert_eq!(days_between(date(2024, 1, 11), date(2024, 1, 1)), -10);
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_date(date(2024, 3, 9)), "09.03.2024");
    }
}
