//! Week window calculation shared by sessions and daily logs.
//!
//! All "this week" filtering in the crate goes through this module so the
//! two collections can never disagree on the boundary. The week opens on
//! the Monday of the ISO week containing "now", regardless of locale.

use chrono::{Local, NaiveDate, Weekday};

/// Fixed-width day format. `in_week` compares these strings
/// lexicographically, which matches date order only because the format is
/// zero-padded `YYYY-MM-DD`. Do not change one without the other.
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Formats a date as a fixed-width `YYYY-MM-DD` stamp.
pub fn day_stamp(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Today's calendar day in local time.
pub fn today() -> String {
    day_stamp(Local::now().date_naive())
}

/// The Monday opening the ISO week that contains `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// The Monday opening the current week, in local time.
pub fn current_week_start() -> String {
    day_stamp(monday_of(Local::now().date_naive()))
}

/// Whether a day stamp falls inside the week opened by `week_start`.
pub fn in_week(date: &str, week_start: &str) -> bool {
    date >= week_start
}
