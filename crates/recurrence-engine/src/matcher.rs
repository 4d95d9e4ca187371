//! Membership test: does an instant satisfy a rule?
//!
//! An instant matches when all of the following hold:
//!
//! 1. **Defaults below the unit.** Calendar fields finer than the unit that
//!    no filter governs must equal the anchor's (or the sentinel's). A
//!    yearly rule without `months` sticks to the anchor's month; a monthly
//!    rule without day filters sticks to the anchor's day of month; a weekly
//!    rule without day filters sticks to the anchor's weekday.
//! 2. **Time of day.** The fields below the unit's floor must equal one of
//!    the rule's times: hour, minute and second for day-or-longer units,
//!    minute and second for `hours`, second for `minutes`.
//! 3. **Phase.** The number of whole units between the anchor and the
//!    instant is a multiple of the frequency, in either direction.
//! 4. **Filters.** `months`, `monthdays`, `weekdays` and `weeks` each hold
//!    when present.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::calendar;
use crate::rule::{Rule, TimeOfDay, Unit};

/// Whether `instant` satisfies `rule`. Sub-second precision is ignored.
pub fn matches(rule: &Rule, instant: DateTime<Utc>) -> bool {
    matches_naive(rule, instant.naive_utc())
}

pub(crate) fn matches_naive(rule: &Rule, t: NaiveDateTime) -> bool {
    date_matches(rule, t.date()) && time_matches(rule, t.time()) && in_phase(rule, t)
}

/// Date-level checks: sub-unit defaults for month/day/weekday plus the
/// `months`, `monthdays`, `weekdays` and `weeks` filters.
pub(crate) fn date_matches(rule: &Rule, date: NaiveDate) -> bool {
    let reference = rule.reference();
    let selects_days = rule.selects_days();

    let defaults_hold = match rule.unit {
        Unit::Years => {
            (!rule.months.is_empty() || date.month() == reference.month)
                && (selects_days || date.day() == reference.day)
        }
        Unit::Months => selects_days || date.day() == reference.day,
        Unit::Weeks => selects_days || calendar::day_of_week(date) == reference.weekday,
        Unit::Days | Unit::Hours | Unit::Minutes => true,
    };
    if !defaults_hold {
        return false;
    }

    if !rule.months.is_empty() && !rule.months.contains(&date.month()) {
        return false;
    }
    if !rule.monthdays.is_empty() {
        let day = i32::try_from(date.day()).unwrap_or(i32::MAX);
        if !rule.monthdays.contains(&day) {
            return false;
        }
    }
    if !rule.weeks.is_empty() {
        // Empty weekdays make this filter unsatisfiable.
        return rule.weeks.iter().any(|&week| {
            rule.weekdays.iter().any(|&weekday| {
                calendar::nth_weekday_of_month(date.year(), date.month(), weekday, week)
                    == Some(date)
            })
        });
    }
    if !rule.weekdays.is_empty() && !rule.weekdays.contains(&calendar::day_of_week(date)) {
        return false;
    }
    true
}

/// Compare only the fields below the unit's floor.
pub(crate) fn time_matches(rule: &Rule, time: NaiveTime) -> bool {
    let actual = TimeOfDay::of(&time);
    match rule.unit {
        Unit::Minutes => rule.times.iter().any(|t| t.second == actual.second),
        Unit::Hours => rule
            .times
            .iter()
            .any(|t| t.minute == actual.minute && t.second == actual.second),
        Unit::Days | Unit::Weeks | Unit::Months | Unit::Years => rule.times.contains(&actual),
    }
}

/// Whether `t` is a whole number of `frequency`-sized steps from the anchor.
pub(crate) fn in_phase(rule: &Rule, t: NaiveDateTime) -> bool {
    match rule.anchor {
        Some(anchor) if rule.frequency > 1 => {
            let elapsed = calendar::elapsed_periods(rule.unit, anchor.naive_utc(), t);
            elapsed.rem_euclid(i64::from(rule.frequency)) == 0
        }
        _ => true,
    }
}
