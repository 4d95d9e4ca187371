//! The [`Rule`] value and its building blocks.
//!
//! A `Rule` is immutable once built. Every query ([`Rule::matches`],
//! [`Rule::find_next`], [`Rule::find_previous`], [`Rule::find_in_range`])
//! borrows it, so a single rule can be shared freely across threads.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveTime, SubsecRound, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::config::RuleConfig;
use crate::error::{ConfigurationError, Result};
use crate::range::{FindOptions, IntervalSource, Occurrences};
use crate::{matcher, navigator, normalize, range};

// ── Unit ────────────────────────────────────────────────────────────────────

/// The calendar unit a rule repeats in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Unit::Minutes,
        Unit::Hours,
        Unit::Days,
        Unit::Weeks,
        Unit::Months,
        Unit::Years,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
            Unit::Days => "days",
            Unit::Weeks => "weeks",
            Unit::Months => "months",
            Unit::Years => "years",
        }
    }

    /// Whether one period of this unit is shorter than a day.
    pub fn is_sub_daily(self) -> bool {
        matches!(self, Unit::Minutes | Unit::Hours)
    }

    /// Whether a period of this unit spans several days, so that a day-level
    /// filter picks days *within* the period.
    pub fn spans_days(self) -> bool {
        matches!(self, Unit::Weeks | Unit::Months | Unit::Years)
    }
}

impl FromStr for Unit {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::InvalidUnit(s.to_string()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TimeOfDay ───────────────────────────────────────────────────────────────

/// A whole-second time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build a time of day, or `None` if any field is out of range.
    pub fn new(hour: u32, minute: u32, second: u32) -> Option<Self> {
        (hour < 24 && minute < 60 && second < 60).then_some(TimeOfDay {
            hour,
            minute,
            second,
        })
    }

    /// The whole-second time of day of `t`.
    pub fn of<T: Timelike>(t: &T) -> Self {
        TimeOfDay {
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        }
    }

    /// Convert to a chrono time (always valid for a constructed value).
    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ── Reference sub-fields ────────────────────────────────────────────────────

/// The calendar fields a rule falls back to below its unit when no filter
/// governs them: taken from the anchor, or from the zero sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reference {
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
}

impl Reference {
    /// January 1st, Sunday.
    pub const SENTINEL: Reference = Reference {
        month: 1,
        day: 1,
        weekday: 0,
    };

    fn of(anchor: &DateTime<Utc>) -> Self {
        Reference {
            month: anchor.month(),
            day: anchor.day(),
            weekday: calendar::day_of_week(anchor.date_naive()),
        }
    }
}

// ── Rule ────────────────────────────────────────────────────────────────────

/// A normalized recurrence rule.
///
/// Built from a [`RuleConfig`] via [`Rule::new`]. Set-valued fields are kept
/// in sorted order, so two rules built from equivalent configurations compare
/// equal and hash identically.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use recurrence_engine::{Rule, RuleConfig};
///
/// let rule = Rule::new(RuleConfig::new("weeks").weekdays(["sat", "sunday"]).times("12pm")).unwrap();
/// assert!(rule.matches(Utc.with_ymd_and_hms(2006, 12, 16, 12, 0, 0).unwrap()));
/// assert_eq!(
///     rule.find_next(Utc.with_ymd_and_hms(2006, 12, 18, 0, 0, 0).unwrap()),
///     Some(Utc.with_ymd_and_hms(2006, 12, 23, 12, 0, 0).unwrap()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EncodedRule")]
pub struct Rule {
    pub(crate) unit: Unit,
    pub(crate) frequency: u32,
    pub(crate) anchor: Option<DateTime<Utc>>,
    pub(crate) times: BTreeSet<TimeOfDay>,
    pub(crate) weekdays: BTreeSet<u32>,
    pub(crate) weeks: BTreeSet<i32>,
    pub(crate) months: BTreeSet<u32>,
    pub(crate) monthdays: BTreeSet<i32>,
}

impl Rule {
    /// Validate and normalize a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the unit is missing or unknown,
    /// a weekday, month, week or monthday entry is not recognized, the
    /// frequency is zero, a frequency above 1 is given without an anchor, or
    /// a weekly rule has times but neither weekdays nor an anchor.
    pub fn new(config: RuleConfig) -> Result<Self> {
        normalize::normalize(config)
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    /// The times of day the rule fires at, in ascending order.
    pub fn times(&self) -> Vec<TimeOfDay> {
        self.times.iter().copied().collect()
    }

    /// Weekday filter, Sunday = 0.
    pub fn weekdays(&self) -> Vec<u32> {
        self.weekdays.iter().copied().collect()
    }

    pub fn weeks(&self) -> Vec<i32> {
        self.weeks.iter().copied().collect()
    }

    pub fn months(&self) -> Vec<u32> {
        self.months.iter().copied().collect()
    }

    pub fn monthdays(&self) -> Vec<i32> {
        self.monthdays.iter().copied().collect()
    }

    /// Whether any filter picks particular days.
    pub(crate) fn selects_days(&self) -> bool {
        !self.weekdays.is_empty() || !self.weeks.is_empty() || !self.monthdays.is_empty()
    }

    pub(crate) fn reference(&self) -> Reference {
        self.anchor
            .as_ref()
            .map_or(Reference::SENTINEL, Reference::of)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Whether `instant` satisfies the rule. Sub-second parts are ignored.
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        matcher::matches(self, instant)
    }

    /// The first matching instant at or after `instant`.
    pub fn find_next(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        navigator::find_next(self, instant, true)
    }

    /// The first matching instant strictly after `instant`.
    pub fn find_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        navigator::find_next(self, instant, false)
    }

    /// The last matching instant at or before `instant`.
    pub fn find_previous(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        navigator::find_previous(self, instant, true)
    }

    /// The last matching instant strictly before `instant`.
    pub fn find_before(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        navigator::find_previous(self, instant, false)
    }

    /// All matching instants within `bounds` (inclusive), ascending.
    pub fn find_in_range<B: IntervalSource>(
        &self,
        bounds: B,
        options: &FindOptions,
    ) -> Vec<DateTime<Utc>> {
        range::find_in_range(self, bounds, options)
    }

    /// Lazily enumerate matches within `bounds`. Each call starts afresh.
    pub fn occurrences<B: IntervalSource>(&self, bounds: B, options: &FindOptions) -> Occurrences<'_> {
        Occurrences::new(self, bounds, options)
    }
}

// ── Persistent encoding ─────────────────────────────────────────────────────

/// Wire shape of a [`Rule`]. Decoding goes through here so the invariants
/// that [`Rule::new`] enforces also hold for decoded rules.
#[derive(Deserialize)]
struct EncodedRule {
    unit: Unit,
    frequency: u32,
    anchor: Option<DateTime<Utc>>,
    times: BTreeSet<TimeOfDay>,
    #[serde(default)]
    weekdays: BTreeSet<u32>,
    #[serde(default)]
    weeks: BTreeSet<i32>,
    #[serde(default)]
    months: BTreeSet<u32>,
    #[serde(default)]
    monthdays: BTreeSet<i32>,
}

impl TryFrom<EncodedRule> for Rule {
    type Error = ConfigurationError;

    fn try_from(encoded: EncodedRule) -> Result<Self> {
        if encoded.frequency == 0 {
            return Err(ConfigurationError::InvalidFrequency(0));
        }
        if encoded.frequency > 1 && encoded.anchor.is_none() {
            return Err(ConfigurationError::MissingAnchor(encoded.frequency));
        }
        if let Some(&day) = encoded.weekdays.iter().find(|&&d| d > 6) {
            return Err(ConfigurationError::InvalidWeekday(day.to_string()));
        }
        if let Some(&month) = encoded.months.iter().find(|&&m| !(1..=12).contains(&m)) {
            return Err(ConfigurationError::InvalidMonth(month.to_string()));
        }
        if let Some(&week) = encoded.weeks.iter().find(|&&w| !normalize::is_valid_week(w)) {
            return Err(ConfigurationError::InvalidWeek(i64::from(week)));
        }
        if let Some(time) = encoded
            .times
            .iter()
            .find(|t| TimeOfDay::new(t.hour, t.minute, t.second).is_none())
        {
            return Err(ConfigurationError::Malformed(format!(
                "time of day out of range: {time}"
            )));
        }
        let anchor = encoded.anchor.map(|a| a.trunc_subsecs(0));
        let selects_days = !encoded.weekdays.is_empty()
            || !encoded.weeks.is_empty()
            || !encoded.monthdays.is_empty();
        let times = if encoded.times.is_empty() {
            BTreeSet::from([normalize::default_time(
                encoded.unit,
                anchor.as_ref(),
                selects_days,
            )])
        } else {
            encoded.times
        };

        Ok(Rule {
            unit: encoded.unit,
            frequency: encoded.frequency,
            anchor,
            times,
            weekdays: encoded.weekdays,
            weeks: encoded.weeks,
            months: encoded.months,
            monthdays: encoded.monthdays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monthly() -> Rule {
        RuleConfig::new("months")
            .frequency(2)
            .anchor(Utc.with_ymd_and_hms(2006, 4, 15, 10, 30, 0).unwrap())
            .monthdays([3, 7])
            .times("5pm 4:45:12am")
            .build()
            .unwrap()
    }

    #[test]
    fn test_unit_parses_case_insensitively() {
        assert_eq!("Days".parse::<Unit>().unwrap(), Unit::Days);
        assert_eq!(" years ".parse::<Unit>().unwrap(), Unit::Years);
    }

    #[test]
    fn test_unit_rejects_singular() {
        let err = "day".parse::<Unit>().unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidUnit("day".to_string()));
    }

    #[test]
    fn test_unit_display_round_trips() {
        for unit in Unit::ALL {
            assert_eq!(unit.to_string().parse::<Unit>().unwrap(), unit);
        }
    }

    #[test]
    fn test_time_of_day_bounds() {
        assert!(TimeOfDay::new(23, 59, 59).is_some());
        assert!(TimeOfDay::new(24, 0, 0).is_none());
        assert!(TimeOfDay::new(0, 60, 0).is_none());
        assert_eq!(TimeOfDay::new(4, 5, 6).unwrap().to_string(), "04:05:06");
    }

    #[test]
    fn test_equal_configs_build_equal_rules() {
        assert_eq!(monthly(), monthly());
    }

    #[test]
    fn test_one_second_difference_breaks_equality() {
        let other = RuleConfig::new("months")
            .frequency(2)
            .anchor(Utc.with_ymd_and_hms(2006, 4, 15, 10, 30, 0).unwrap())
            .monthdays([3, 7])
            .times("5pm 4:45:11am")
            .build()
            .unwrap();
        assert_ne!(other, monthly());
    }

    #[test]
    fn test_json_round_trip_preserves_equality() {
        let rule = monthly();
        let encoded = serde_json::to_string(&rule).unwrap();
        let decoded: Rule = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, rule);
    }

    #[test]
    fn test_decoding_rejects_frequency_without_anchor() {
        let json = r#"{"unit":"days","frequency":3,"anchor":null,"times":[]}"#;
        let err = serde_json::from_str::<Rule>(json).unwrap_err();
        assert!(err.to_string().contains("requires an anchor"), "got: {err}");
    }

    #[test]
    fn test_decoding_rejects_out_of_range_weekday() {
        let json = r#"{"unit":"weeks","frequency":1,"anchor":null,"times":[],"weekdays":[9]}"#;
        assert!(serde_json::from_str::<Rule>(json).is_err());
    }

    #[test]
    fn test_decoding_empty_times_uses_default_time() {
        let json = r#"{"unit":"days","frequency":1,"anchor":"2006-11-01T10:15:22.250Z","times":[]}"#;
        let decoded: Rule = serde_json::from_str(json).unwrap();
        let built = RuleConfig::new("days")
            .anchor(Utc.with_ymd_and_hms(2006, 11, 1, 10, 15, 22).unwrap())
            .build()
            .unwrap();
        assert_eq!(decoded, built);
        assert_eq!(decoded.times(), vec![TimeOfDay::new(10, 15, 22).unwrap()]);
        assert!(decoded.matches(Utc.with_ymd_and_hms(2006, 11, 7, 10, 15, 22).unwrap()));
        assert!(!decoded.matches(Utc.with_ymd_and_hms(2006, 11, 7, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_decoding_empty_times_with_day_filter_uses_midnight() {
        let json = r#"{"unit":"months","frequency":2,"anchor":"2006-04-15T10:30:00Z","times":[],"monthdays":[10,18]}"#;
        let decoded: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.times(), vec![TimeOfDay::MIDNIGHT]);
    }

    #[test]
    fn test_reference_defaults_to_sentinel() {
        let rule = RuleConfig::new("days").build().unwrap();
        assert_eq!(rule.reference(), Reference::SENTINEL);
    }

    #[test]
    fn test_reference_follows_anchor() {
        let rule = monthly();
        assert_eq!(
            rule.reference(),
            Reference {
                month: 4,
                day: 15,
                weekday: 6
            }
        );
    }
}
