//! Bounded enumeration of matches.
//!
//! [`find_in_range`] collects every match inside an inclusive interval, in
//! ascending order, optionally capped by [`FindOptions::limit`]. The
//! underlying [`Occurrences`] iterator is lazy: each step is one forward
//! search seeded one second past the previous result. Enumeration starts at
//! the first whole second at or after the start bound.

use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::navigator;
use crate::rule::Rule;

/// Anything that exposes an inclusive start and end instant.
pub trait IntervalSource {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;
}

/// A plain inclusive interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Interval { start, end }
    }
}

impl IntervalSource for Interval {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl IntervalSource for (DateTime<Utc>, DateTime<Utc>) {
    fn start(&self) -> DateTime<Utc> {
        self.0
    }

    fn end(&self) -> DateTime<Utc> {
        self.1
    }
}

impl IntervalSource for RangeInclusive<DateTime<Utc>> {
    fn start(&self) -> DateTime<Utc> {
        *RangeInclusive::start(self)
    }

    fn end(&self) -> DateTime<Utc> {
        *RangeInclusive::end(self)
    }
}

impl<T: IntervalSource + ?Sized> IntervalSource for &T {
    fn start(&self) -> DateTime<Utc> {
        (**self).start()
    }

    fn end(&self) -> DateTime<Utc> {
        (**self).end()
    }
}

/// Options for [`find_in_range`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Stop after this many matches.
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn with_limit(limit: usize) -> Self {
        FindOptions { limit: Some(limit) }
    }
}

/// Every match of `rule` within `bounds` (both ends inclusive), ascending.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use recurrence_engine::{find_in_range, FindOptions, RuleConfig};
///
/// let rule = RuleConfig::new("minutes")
///     .frequency(5)
///     .anchor(Utc.with_ymd_and_hms(2006, 9, 1, 10, 30, 0).unwrap())
///     .build()
///     .unwrap();
/// let start = Utc.with_ymd_and_hms(2006, 12, 12, 0, 45, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2006, 12, 12, 1, 15, 0).unwrap();
///
/// assert_eq!(find_in_range(&rule, (start, end), &FindOptions::default()).len(), 7);
/// assert_eq!(find_in_range(&rule, start..=end, &FindOptions::with_limit(3)).len(), 3);
/// ```
pub fn find_in_range<B: IntervalSource>(
    rule: &Rule,
    bounds: B,
    options: &FindOptions,
) -> Vec<DateTime<Utc>> {
    Occurrences::new(rule, bounds, options).collect()
}

/// Lazy iterator over the matches of a rule within an interval.
#[derive(Debug, Clone)]
pub struct Occurrences<'r> {
    rule: &'r Rule,
    cursor: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    remaining: Option<usize>,
}

impl<'r> Occurrences<'r> {
    pub fn new<B: IntervalSource>(rule: &'r Rule, bounds: B, options: &FindOptions) -> Self {
        let end = bounds.end();
        Occurrences {
            rule,
            cursor: whole_second_at_or_after(bounds.start()).filter(|start| *start <= end),
            end,
            remaining: options.limit,
        }
    }
}

fn whole_second_at_or_after(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let floor = t.trunc_subsecs(0);
    if floor == t {
        Some(t)
    } else {
        floor.checked_add_signed(Duration::seconds(1))
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            self.cursor = None;
        }
        let cursor = self.cursor.take()?;
        let found = navigator::find_next(self.rule, cursor, true).filter(|t| *t <= self.end)?;

        self.cursor = found.checked_add_signed(Duration::seconds(1));
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(found)
    }
}

impl FusedIterator for Occurrences<'_> {}
