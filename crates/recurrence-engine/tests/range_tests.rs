//! Bounded enumeration.

use chrono::{DateTime, TimeZone, Utc};
use recurrence_engine::{find_in_range, FindOptions, Interval, IntervalSource, Rule, RuleConfig};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    utc(y, m, d, 0, 0, 0)
}

fn assert_found(rule: &Rule, bounds: impl IntervalSource + Copy, expected: usize) -> Vec<DateTime<Utc>> {
    let found = rule.find_in_range(bounds, &FindOptions::default());
    assert_eq!(found.len(), expected);
    for t in &found {
        assert!(rule.matches(*t), "{t} does not match");
        assert!(*t >= bounds.start() && *t <= bounds.end(), "{t} out of bounds");
    }
    assert!(found.windows(2).all(|w| w[0] < w[1]));
    found
}

fn five_minutely() -> Rule {
    RuleConfig::new("minutes")
        .frequency(5)
        .anchor(utc(2006, 9, 1, 10, 30, 0))
        .build()
        .unwrap()
}

/// Caller-defined bounds type.
struct Window {
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

impl IntervalSource for Window {
    fn start(&self) -> DateTime<Utc> {
        self.first
    }

    fn end(&self) -> DateTime<Utc> {
        self.last
    }
}

#[test]
fn test_yearly_feb_4th_over_20_years() {
    let rule = RuleConfig::new("years")
        .month("feb")
        .monthdays([4])
        .build()
        .unwrap();
    assert_found(&rule, (utc(2006, 12, 12, 1, 0, 0), utc(2026, 12, 12, 1, 45, 0)), 20);
}

#[test]
fn test_yearly_feb_tuesdays_and_wednesdays_over_20_years() {
    let rule = RuleConfig::new("years")
        .month("feb")
        .weekdays(["tuesday", "weds"])
        .build()
        .unwrap();
    // Eight per February, plus Feb 29 2012 (a Wednesday).
    assert_found(&rule, (utc(2006, 12, 12, 1, 0, 0), utc(2026, 12, 12, 1, 45, 0)), 161);
}

#[test]
fn test_yearly_anchor_over_20_years() {
    let rule = RuleConfig::new("years")
        .anchor(utc(2006, 4, 1, 10, 0, 0))
        .build()
        .unwrap();
    let found = assert_found(
        &rule,
        (utc(2006, 12, 12, 1, 0, 0), utc(2026, 12, 12, 1, 45, 0)),
        20,
    );
    assert_eq!(found.first(), Some(&utc(2007, 4, 1, 10, 0, 0)));
    assert_eq!(found.last(), Some(&utc(2026, 4, 1, 10, 0, 0)));
}

#[test]
fn test_hourly_anchor_over_a_year() {
    let rule = RuleConfig::new("hours")
        .anchor(utc(2001, 5, 15, 11, 17, 0))
        .build()
        .unwrap();
    let found = rule.find_in_range((day(2006, 1, 1), day(2007, 1, 1)), &FindOptions::default());
    assert_eq!(found.len(), 24 * 365);
}

#[test]
fn test_thirty_minutely_first_match_after_start() {
    let rule = RuleConfig::new("minutes")
        .frequency(30)
        .anchor(utc(2006, 1, 1, 1, 15, 0))
        .build()
        .unwrap();
    let found = rule.find_in_range((utc(2006, 1, 15, 2, 0, 0), day(2006, 1, 16)), &FindOptions::default());
    assert_eq!(found.first(), Some(&utc(2006, 1, 15, 2, 15, 0)));
}

#[test]
fn test_five_minutely_seven_in_thirty_minutes() {
    let rule = five_minutely();
    assert_found(&rule, (utc(2006, 12, 12, 0, 45, 0), utc(2006, 12, 12, 1, 15, 0)), 7);
}

#[test]
fn test_five_minutely_ten_in_forty_five_minutes() {
    let rule = five_minutely();
    assert_found(&rule, (utc(2006, 12, 12, 1, 0, 0), utc(2006, 12, 12, 1, 45, 0)), 10);
}

#[test]
fn test_limit_caps_results() {
    let rule = five_minutely();
    let start = utc(2006, 12, 12, 0, 45, 0);
    let end = utc(2006, 12, 12, 1, 15, 0);
    let options = FindOptions::with_limit(3);

    let from_pair = rule.find_in_range((start, end), &options);
    let from_range = rule.find_in_range(start..=end, &options);
    assert_eq!(from_pair.len(), 3);
    assert_eq!(from_pair, from_range);
    assert_eq!(from_pair.last(), Some(&utc(2006, 12, 12, 0, 55, 0)));
}

#[test]
fn test_bounds_shapes_agree() {
    let rule = five_minutely();
    let start = utc(2006, 12, 12, 0, 45, 0);
    let end = utc(2006, 12, 12, 1, 15, 0);
    let options = FindOptions::default();

    let expected = find_in_range(&rule, (start, end), &options);
    assert_eq!(find_in_range(&rule, start..=end, &options), expected);
    assert_eq!(find_in_range(&rule, Interval::new(start, end), &options), expected);
    assert_eq!(
        find_in_range(&rule, &Window { first: start, last: end }, &options),
        expected
    );
    assert_eq!(expected.first(), Some(&start));
}

#[test]
fn test_no_matches_in_range() {
    let rule = RuleConfig::new("years")
        .month("feb")
        .monthdays([4])
        .build()
        .unwrap();
    let found = rule.find_in_range((day(2007, 3, 1), day(2007, 12, 31)), &FindOptions::default());
    assert!(found.is_empty());
}

#[test]
fn test_single_instant_range() {
    let rule = RuleConfig::new("days").build().unwrap();
    let t = day(2006, 5, 5);
    assert_eq!(rule.find_in_range((t, t), &FindOptions::default()), vec![t]);
}
