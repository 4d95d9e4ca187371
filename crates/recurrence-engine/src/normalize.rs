//! Validation and canonicalization of a [`RuleConfig`] into a [`Rule`].
//!
//! Structural fields are validated strictly: an unknown unit, weekday or
//! month name is an error. The time-of-day string is lenient: unparseable
//! tokens are dropped, and an empty result falls back to the rule's default
//! time of day.

use std::collections::BTreeSet;

use chrono::{DateTime, SubsecRound, Utc};

use crate::calendar;
use crate::config::{OneOrMany, RuleConfig, Token};
use crate::error::{ConfigurationError, Result};
use crate::rule::{Rule, TimeOfDay, Unit};
use crate::times::parse_times;

/// Build a [`Rule`] from a raw configuration.
///
/// # Errors
///
/// See [`Rule::new`].
pub fn normalize(config: RuleConfig) -> Result<Rule> {
    let unit: Unit = config
        .unit
        .as_deref()
        .ok_or(ConfigurationError::MissingUnit)?
        .parse()?;

    let frequency = config.frequency.unwrap_or(1);
    if frequency == 0 {
        return Err(ConfigurationError::InvalidFrequency(frequency));
    }
    let anchor = config.anchor.map(|a| a.trunc_subsecs(0));
    if frequency > 1 && anchor.is_none() {
        return Err(ConfigurationError::MissingAnchor(frequency));
    }

    let weekdays = entries(config.weekdays)
        .map(|token| weekday_index(&token))
        .collect::<Result<BTreeSet<_>>>()?;
    let weeks = entries(config.weeks)
        .map(week_ordinal)
        .collect::<Result<BTreeSet<_>>>()?;
    let months = entries(config.months)
        .map(|token| month_number(&token))
        .collect::<Result<BTreeSet<_>>>()?;
    let monthdays = entries(config.monthdays)
        .map(|token| monthday(&token))
        .collect::<Result<BTreeSet<_>>>()?;

    if unit == Unit::Weeks && config.times.is_some() && weekdays.is_empty() && anchor.is_none() {
        return Err(ConfigurationError::AmbiguousWeeklyTimes);
    }

    let selects_days = !weekdays.is_empty() || !weeks.is_empty() || !monthdays.is_empty();
    let parsed = config.times.as_deref().map(parse_times).unwrap_or_default();
    let times = if parsed.is_empty() {
        BTreeSet::from([default_time(unit, anchor.as_ref(), selects_days)])
    } else {
        parsed
    };

    if !weeks.is_empty() && weekdays.is_empty() {
        tracing::debug!(?weeks, "weeks without weekdays never match");
    }

    let rule = Rule {
        unit,
        frequency,
        anchor,
        times,
        weekdays,
        weeks,
        months,
        monthdays,
    };
    tracing::debug!(?rule, "normalized rule");
    Ok(rule)
}

pub(crate) fn is_valid_week(week: i32) -> bool {
    (-5..=-1).contains(&week) || (1..=5).contains(&week)
}

fn entries<T>(field: Option<OneOrMany<T>>) -> impl Iterator<Item = T> {
    field.map(OneOrMany::into_vec).unwrap_or_default().into_iter()
}

/// Time of day used when the configuration names none.
///
/// The anchor's time carries over, except when the unit spans several days
/// and a filter picks the days: then each picked day starts at midnight.
pub(crate) fn default_time(unit: Unit, anchor: Option<&DateTime<Utc>>, selects_days: bool) -> TimeOfDay {
    match anchor {
        Some(anchor) if !(unit.spans_days() && selects_days) => TimeOfDay::of(anchor),
        _ => TimeOfDay::MIDNIGHT,
    }
}

fn weekday_index(token: &Token) -> Result<u32> {
    let index = match token {
        Token::Index(i) => u32::try_from(*i).ok(),
        Token::Name(name) => match name.trim().parse::<u32>() {
            Ok(i) => Some(i),
            Err(_) => calendar::weekday_by_name(name),
        },
    };
    index
        .filter(|i| *i <= 6)
        .ok_or_else(|| ConfigurationError::InvalidWeekday(token.to_string()))
}

fn month_number(token: &Token) -> Result<u32> {
    let number = match token {
        Token::Index(i) => u32::try_from(*i).ok(),
        Token::Name(name) => match name.trim().parse::<u32>() {
            Ok(i) => Some(i),
            Err(_) => calendar::month_by_name(name),
        },
    };
    number
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ConfigurationError::InvalidMonth(token.to_string()))
}

fn week_ordinal(week: i64) -> Result<i32> {
    i32::try_from(week)
        .ok()
        .filter(|w| is_valid_week(*w))
        .ok_or(ConfigurationError::InvalidWeek(week))
}

/// Monthdays are not range-checked: a day that never occurs never matches.
fn monthday(token: &Token) -> Result<i32> {
    let day = match token {
        Token::Index(i) => i32::try_from(*i).ok(),
        Token::Name(name) => name.trim().parse::<i32>().ok(),
    };
    day.ok_or_else(|| ConfigurationError::InvalidMonthday(token.to_string()))
}
