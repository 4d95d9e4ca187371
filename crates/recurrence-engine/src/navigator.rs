//! Directional search for the nearest matching instant.
//!
//! The search walks whole unit periods (years, months, Sunday-based weeks,
//! days, hours or minutes) rather than individual seconds:
//!
//! 1. Round the query instant down to the start of its period.
//! 2. Jump to the nearest period that is in phase with the anchor.
//! 3. Expand the period into its candidate instants (every day the date
//!    filters accept, crossed with the rule's times of day) and take the
//!    first one past the query instant in the search direction.
//! 4. Otherwise step `frequency` periods and repeat.
//!
//! Sub-daily rules skip whole days that the date filters reject, so an hourly
//! rule restricted to the 15th of the month does not visit every hour.
//!
//! A rule whose filters can never be satisfied (February 30th) would search
//! forever; [`MAX_ITERATIONS`] bounds the walk and the search reports `None`.

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Timelike, Utc};

use crate::calendar::{add_periods, elapsed_periods, period_start};
use crate::matcher::{date_matches, matches, matches_naive};
use crate::rule::{Rule, Unit};

/// Upper bound on periods (or skipped days) visited by one search.
pub const MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// The first matching instant after `instant` (or at it, when `inclusive`).
///
/// Results are whole seconds. An inclusive hit on an instant with a
/// sub-second part returns that instant truncated to the second.
///
/// Returns `None` when no match exists within [`MAX_ITERATIONS`] periods or
/// before the end of the representable calendar.
pub fn find_next(rule: &Rule, instant: DateTime<Utc>, inclusive: bool) -> Option<DateTime<Utc>> {
    search(rule, instant, inclusive, Direction::Forward)
}

/// The last matching instant before `instant` (or at it, when `inclusive`).
///
/// Returns `None` when no match exists within [`MAX_ITERATIONS`] periods or
/// before the start of the representable calendar.
pub fn find_previous(
    rule: &Rule,
    instant: DateTime<Utc>,
    inclusive: bool,
) -> Option<DateTime<Utc>> {
    search(rule, instant, inclusive, Direction::Backward)
}

fn search(
    rule: &Rule,
    instant: DateTime<Utc>,
    inclusive: bool,
    direction: Direction,
) -> Option<DateTime<Utc>> {
    if inclusive && matches(rule, instant) {
        return Some(instant.trunc_subsecs(0));
    }

    let origin = instant.naive_utc();
    let mut period = align(rule, period_start(rule.unit, origin)?, direction)?;

    for _ in 0..MAX_ITERATIONS {
        if rule.unit.is_sub_daily() && !date_matches(rule, period.date()) {
            period = skip_day(rule, period, direction)?;
            continue;
        }

        let candidates = candidates(rule, period)?;
        let found = match direction {
            Direction::Forward => candidates
                .into_iter()
                .find(|c| *c > origin && matches_naive(rule, *c)),
            Direction::Backward => candidates
                .into_iter()
                .rev()
                .find(|c| *c < origin && matches_naive(rule, *c)),
        };
        if let Some(found) = found {
            return Some(found.and_utc());
        }

        period = add_periods(rule.unit, period, direction.sign() * step(rule))?;
    }

    tracing::debug!(
        unit = %rule.unit,
        %instant,
        ?direction,
        "no match within {MAX_ITERATIONS} periods"
    );
    None
}

/// Periods between consecutive in-phase periods.
fn step(rule: &Rule) -> i64 {
    match rule.anchor {
        Some(_) => i64::from(rule.frequency),
        None => 1,
    }
}

/// Move `period` to the nearest in-phase period in `direction` (possibly
/// itself).
fn align(rule: &Rule, period: NaiveDateTime, direction: Direction) -> Option<NaiveDateTime> {
    let Some(anchor) = rule.anchor.filter(|_| rule.frequency > 1) else {
        return Some(period);
    };
    let frequency = i64::from(rule.frequency);
    let offset = elapsed_periods(rule.unit, anchor.naive_utc(), period).rem_euclid(frequency);
    if offset == 0 {
        return Some(period);
    }
    match direction {
        Direction::Forward => add_periods(rule.unit, period, frequency - offset),
        Direction::Backward => add_periods(rule.unit, period, -offset),
    }
}

/// For sub-daily units: leave the current day and land on the first (or
/// last) in-phase period of the neighbouring day.
fn skip_day(rule: &Rule, period: NaiveDateTime, direction: Direction) -> Option<NaiveDateTime> {
    let next = match direction {
        Direction::Forward => period
            .date()
            .succ_opt()?
            .and_hms_opt(0, 0, 0)?,
        Direction::Backward => period
            .date()
            .pred_opt()?
            .and_hms_opt(23, 59, 0)?,
    };
    align(rule, period_start(rule.unit, next)?, direction)
}

/// Candidate instants in a period, ascending. A superset of the period's
/// matches; callers still run the full predicate.
fn candidates(rule: &Rule, period: NaiveDateTime) -> Option<Vec<NaiveDateTime>> {
    let mut out = Vec::new();
    match rule.unit {
        Unit::Years | Unit::Months | Unit::Weeks | Unit::Days => {
            let end = add_periods(rule.unit, period, 1)?.date();
            let mut date = period.date();
            while date < end {
                if date_matches(rule, date) {
                    for time in &rule.times {
                        out.push(date.and_time(time.to_naive()?));
                    }
                }
                date = date.succ_opt()?;
            }
        }
        Unit::Hours => {
            let mut offsets: Vec<i64> = rule
                .times
                .iter()
                .map(|t| i64::from(t.minute * 60 + t.second))
                .collect();
            offsets.sort_unstable();
            offsets.dedup();
            for offset in offsets {
                out.push(period.checked_add_signed(Duration::seconds(offset))?);
            }
        }
        Unit::Minutes => {
            let mut seconds: Vec<u32> = rule.times.iter().map(|t| t.second).collect();
            seconds.sort_unstable();
            seconds.dedup();
            for second in seconds {
                out.push(period.with_second(second)?);
            }
        }
    }
    Some(out)
}
