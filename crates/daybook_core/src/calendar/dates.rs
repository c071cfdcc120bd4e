//! Calendar date helpers.
//!
//! # Responsibility
//! - Parse and format canonical `YYYY-MM-DD` date strings.
//! - Compute week numbers and week boundaries for a configurable start of
//!   the week.
//!
//! # Invariants
//! - A week is owned by the year containing the majority of its days (the
//!   year of the week's fourth day). For Monday starts this matches ISO 8601.
//! - `week_number_in_year` returns 0 for dates whose week is owned by the
//!   prior year.

use chrono::{Datelike, Days, Local, NaiveDate};

/// Canonical date format used across labels and the `{isoDate}` token.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// First day of the week convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOfWeek {
    Monday,
    Sunday,
}

impl StartOfWeek {
    /// Parses the `startOfTheWeek` label vocabulary.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value {
            "monday" => Some(Self::Monday),
            "sunday" => Some(Self::Sunday),
            _ => None,
        }
    }

    fn days_into_week(self, date: NaiveDate) -> u32 {
        match self {
            Self::Monday => date.weekday().num_days_from_monday(),
            Self::Sunday => date.weekday().num_days_from_sunday(),
        }
    }
}

/// A week position keyed to its owning year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekOfYear {
    /// Week-owning year; may differ from the Gregorian year of days inside
    /// the week.
    pub year: i32,
    /// 1-based week number within the owning year.
    pub week: u32,
}

/// Parses a canonical date, tolerating trailing time-of-day text.
///
/// Input is trimmed and truncated to the 10-char date prefix before parsing.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let head: String = input.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&head, CANONICAL_DATE_FORMAT).ok()
}

/// Formats a date in canonical form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Returns today's date in the local timezone.
pub fn local_now_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Full English month name.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Full English weekday name.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAYS[date.weekday().num_days_from_sunday() as usize]
}

/// First day of the week containing `date` under the given convention.
pub fn start_of_week_date(date: NaiveDate, start: StartOfWeek) -> NaiveDate {
    date - Days::new(u64::from(start.days_into_week(date)))
}

/// First day of the year containing `date`.
pub fn first_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// December 31st of the year before the one containing `date`.
pub fn prior_year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - 1, 12, 31).unwrap_or(date)
}

/// Computes the week position of `date` keyed to the week-owning year.
///
/// The owning year is the year of the week's fourth day; the week number
/// counts weeks of that year from 1. For `StartOfWeek::Monday` this is the
/// ISO 8601 week date.
pub fn week_of_year(date: NaiveDate, start: StartOfWeek) -> WeekOfYear {
    let week_start = start_of_week_date(date, start);
    let midpoint = week_start + Days::new(3);
    WeekOfYear {
        year: midpoint.year(),
        week: midpoint.ordinal0() / 7 + 1,
    }
}

/// Week number of `date` within its own Gregorian year.
///
/// Returns 0 when the date's week is owned by the prior year (early-January
/// days before the year's first configured week). A late-December date whose
/// week is owned by the following year reports that week's number (1).
pub fn week_number_in_year(date: NaiveDate, start: StartOfWeek) -> u32 {
    let owned = week_of_year(date, start);
    if owned.year < date.year() {
        0
    } else {
        owned.week
    }
}
