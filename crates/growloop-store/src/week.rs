//! ISO-8601 week identity helpers.
//!
//! Week ids use ISO week numbering (Monday-start, week 1 contains the year's
//! first Thursday) so the same date always maps to the same week regardless
//! of locale or timezone string parsing.

use chrono::{Datelike, Duration, NaiveDate};

/// Week id for a date, formatted `YYYY-Www` (e.g. `2026-W35`).
///
/// The year is the ISO week-year, which differs from the calendar year around
/// January 1st.
#[must_use]
pub fn week_id(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date - Duration::days(offset)
}
