//! Title pattern expansion.
//!
//! # Responsibility
//! - Expand `{token}` title templates against a date and a start-of-week
//!   convention.
//!
//! # Invariants
//! - Literal text outside tokens passes through unchanged.
//! - Unrecognized tokens fail; they are never silently dropped.
//! - `{weekNumberPadded}` zero-pads single digits 1 to 9; week 0 stays
//!   unpadded.

use crate::calendar::dates::{
    format_date, month_name, week_number_in_year, weekday_name, StartOfWeek,
};
use crate::calendar::{CalendarError, CalendarResult};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("valid token regex"));

/// Expands a title pattern for the given date.
pub fn expand_title(
    pattern: &str,
    date: NaiveDate,
    start_of_week: StartOfWeek,
) -> CalendarResult<String> {
    let mut title = String::with_capacity(pattern.len());
    let mut literal_start = 0;

    for captures in TOKEN_RE.captures_iter(pattern) {
        let token_match = match captures.get(0) {
            Some(token_match) => token_match,
            None => continue,
        };
        title.push_str(&pattern[literal_start..token_match.start()]);
        title.push_str(&expand_token(&captures[1], date, start_of_week)?);
        literal_start = token_match.end();
    }

    title.push_str(&pattern[literal_start..]);
    Ok(title)
}

fn expand_token(
    token: &str,
    date: NaiveDate,
    start_of_week: StartOfWeek,
) -> CalendarResult<String> {
    let expanded = match token {
        "year" => format!("{:04}", date.year()),
        "month" => month_name(date).to_string(),
        "monthNumberPadded" => format!("{:02}", date.month()),
        "weekNumber" => week_number_in_year(date, start_of_week).to_string(),
        "weekNumberPadded" => {
            let week = week_number_in_year(date, start_of_week);
            if (1..=9).contains(&week) {
                format!("0{week}")
            } else {
                week.to_string()
            }
        }
        "weekDay" => weekday_name(date).to_string(),
        "weekDay3" => weekday_name(date)[..3].to_string(),
        "weekDay2" => weekday_name(date)[..2].to_string(),
        "dayInMonthPadded" => format!("{:02}", date.day()),
        "isoDate" => format_date(date),
        other => {
            return Err(CalendarError::UnknownPattern {
                token: other.to_string(),
            })
        }
    };
    Ok(expanded)
}
