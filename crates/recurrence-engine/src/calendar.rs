//! Calendar arithmetic shared by matching and searching.
//!
//! All functions are pure and operate on naive civil dates: the engine treats
//! every instant as a position on a single UTC timeline, so there is no
//! timezone or DST handling here.
//!
//! Weekdays are numbered `0..=6` with Sunday as `0`, and weeks begin on
//! Sunday.
//!
//! # Week numbering
//!
//! Two week counters exist:
//!
//! - [`absolute_week`] counts weeks from a fixed epoch and never resets. It is
//!   the only counter used for `weeks`-unit frequency arithmetic, so "every
//!   other week" stays in phase across year boundaries.
//! - [`week_of_year`] is the calendar week number within a year (`%U`
//!   numbering). It resets every January and is provided for callers only.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::rule::Unit;

// ── Name tables ─────────────────────────────────────────────────────────────

/// Weekday names and abbreviations, keyed to Sunday-based indices.
static WEEKDAY_NAMES: [(&str, u32); 18] = [
    ("sunday", 0),
    ("sun", 0),
    ("monday", 1),
    ("mon", 1),
    ("tuesday", 2),
    ("tue", 2),
    ("tues", 2),
    ("wednesday", 3),
    ("wed", 3),
    ("weds", 3),
    ("thursday", 4),
    ("thu", 4),
    ("thur", 4),
    ("thurs", 4),
    ("friday", 5),
    ("fri", 5),
    ("saturday", 6),
    ("sat", 6),
];

static MONTH_NAMES: [(&str, u32); 24] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Look up a weekday by name or abbreviation (case-insensitive).
pub(crate) fn weekday_by_name(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, index)| index)
}

/// Look up a month by name or abbreviation (case-insensitive).
pub(crate) fn month_by_name(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, number)| number)
}

// ── Day-level quantities ────────────────────────────────────────────────────

/// Day of the week, Sunday = 0.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(ny, nm, 1)?;
    u32::try_from((first_next - first).num_days()).ok()
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(day_of_week(date))))
}

/// Epoch-anchored week counter. Consecutive Sunday-to-Saturday weeks have
/// consecutive indices regardless of year boundaries.
pub fn absolute_week(date: NaiveDate) -> i64 {
    // Day 0 of the common era (0000-12-31) is a Sunday.
    i64::from(date.num_days_from_ce()).div_euclid(7)
}

/// Calendar week of the year with weeks starting on Sunday. Days before the
/// first Sunday of January fall in week 0.
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - day_of_week(date)) / 7
}

/// Position of `date` among the same weekdays of its month.
///
/// Returns `(from_start, from_end)`: the first Monday of a month is
/// `(1, _)`, the last is `(_, -1)`.
pub fn weekday_ordinal(date: NaiveDate) -> Option<(i32, i32)> {
    let length = days_in_month(date.year(), date.month())?;
    let day = date.day();
    let from_start = i32::try_from((day - 1) / 7 + 1).ok()?;
    let from_end = i32::try_from((length - day) / 7 + 1).ok()?;
    Some((from_start, -from_end))
}

/// Find the Nth weekday in a month. `ordinal < 0` counts from the end of the
/// month: `-1` is the last occurrence, `-2` the one before it.
///
/// Returns `None` when the month has no such occurrence (e.g. a 5th Friday
/// in a month with four) or when `ordinal` is zero.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: u32, ordinal: i32) -> Option<NaiveDate> {
    if ordinal == 0 || weekday > 6 {
        return None;
    }
    if ordinal > 0 {
        // Forward from the first of the month
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let diff = (weekday + 7 - day_of_week(first)) % 7;
        let first_occurrence = first + Duration::days(i64::from(diff));
        let target = first_occurrence + Duration::weeks(i64::from(ordinal - 1));
        (target.month() == month).then_some(target)
    } else {
        // Backward from the last of the month
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
        let diff = (day_of_week(last) + 7 - weekday) % 7;
        let last_occurrence = last - Duration::days(i64::from(diff));
        let target = last_occurrence - Duration::weeks(i64::from(-ordinal - 1));
        (target.month() == month).then_some(target)
    }
}

// ── Unit periods ────────────────────────────────────────────────────────────

/// Start of the `unit` period containing `t`: Jan 1 for years, the 1st for
/// months, Sunday for weeks, midnight for days, `:00` for hours and minutes.
pub(crate) fn period_start(unit: Unit, t: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = t.date();
    match unit {
        Unit::Years => date.with_ordinal(1)?.and_hms_opt(0, 0, 0),
        Unit::Months => date.with_day(1)?.and_hms_opt(0, 0, 0),
        Unit::Weeks => week_start(date)?.and_hms_opt(0, 0, 0),
        Unit::Days => date.and_hms_opt(0, 0, 0),
        Unit::Hours => date.and_hms_opt(t.hour(), 0, 0),
        Unit::Minutes => date.and_hms_opt(t.hour(), t.minute(), 0),
    }
}

/// Move a period start by `n` whole periods (negative moves backward).
pub(crate) fn add_periods(unit: Unit, start: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
    match unit {
        Unit::Years => {
            let year = i32::try_from(i64::from(start.year()) + n).ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
        }
        Unit::Months => {
            let total = i64::from(start.year()) * 12 + i64::from(start.month0()) + n;
            let year = i32::try_from(total.div_euclid(12)).ok()?;
            let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
            NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
        }
        Unit::Weeks => start.checked_add_signed(Duration::try_weeks(n)?),
        Unit::Days => start.checked_add_signed(Duration::try_days(n)?),
        Unit::Hours => start.checked_add_signed(Duration::try_hours(n)?),
        Unit::Minutes => start.checked_add_signed(Duration::try_minutes(n)?),
    }
}

/// Number of `unit` periods from the period containing `from` to the period
/// containing `to` (negative when `to` is earlier).
pub(crate) fn elapsed_periods(unit: Unit, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let days = (to.date() - from.date()).num_days();
    match unit {
        Unit::Years => years,
        Unit::Months => years * 12 + i64::from(to.month()) - i64::from(from.month()),
        Unit::Weeks => absolute_week(to.date()) - absolute_week(from.date()),
        Unit::Days => days,
        Unit::Hours => days * 24 + i64::from(to.hour()) - i64::from(from.hour()),
        Unit::Minutes => {
            let to_minute = i64::from(to.hour() * 60 + to.minute());
            let from_minute = i64::from(from.hour() * 60 + from.minute());
            days * 1440 + to_minute - from_minute
        }
    }
}
