//! Property tests over generated rules and instants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use recurrence_engine::{FindOptions, Rule, RuleConfig};

const UNITS: [&str; 6] = ["minutes", "hours", "days", "weeks", "months", "years"];

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. roughly 2030
    (0i64..950_000_000).prop_map(|secs| base() + Duration::seconds(secs))
}

fn rule() -> impl Strategy<Value = Rule> {
    (
        0usize..UNITS.len(),
        1u32..4,
        instant(),
        prop::collection::btree_set(0u32..7, 0..3),
        prop::collection::btree_set(1i32..29, 0..3),
        prop::option::of("(1[0-2]|[1-9])(:[0-5][0-9])?(am|pm)?"),
    )
        .prop_map(|(unit, frequency, anchor, weekdays, monthdays, times)| {
            let mut config = RuleConfig::new(UNITS[unit])
                .frequency(frequency)
                .anchor(anchor)
                .weekdays(weekdays)
                .monthdays(monthdays);
            if let Some(times) = times {
                config = config.times(times);
            }
            config.build().unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_next_matches_and_is_not_earlier(rule in rule(), t in instant()) {
        if let Some(next) = rule.find_next(t) {
            prop_assert!(rule.matches(next));
            prop_assert!(next >= t);
        }
    }

    #[test]
    fn prop_previous_matches_and_is_not_later(rule in rule(), t in instant()) {
        if let Some(previous) = rule.find_previous(t) {
            prop_assert!(rule.matches(previous));
            prop_assert!(previous <= t);
        }
    }

    #[test]
    fn prop_matching_instant_is_its_own_next(rule in rule(), t in instant()) {
        if let Some(next) = rule.find_next(t) {
            prop_assert_eq!(rule.find_next(next), Some(next));
            prop_assert_eq!(rule.find_previous(next), Some(next));
        }
    }

    #[test]
    fn prop_after_and_before_bracket_a_gap(rule in rule(), t in instant()) {
        if let (Some(before), Some(after)) = (rule.find_before(t), rule.find_after(t)) {
            prop_assert!(before < t && t < after);
            // Nothing matches strictly between the two, apart from t itself.
            prop_assert_eq!(rule.find_after(before), if rule.matches(t) { Some(t) } else { Some(after) });
        }
    }

    #[test]
    fn prop_range_is_ascending_unique_and_bounded(
        rule in rule(),
        start in instant(),
        span in 0i64..(40 * 86_400),
        limit in prop::option::of(0usize..20),
    ) {
        let end = start + Duration::seconds(span);
        let options = FindOptions { limit };
        let found = rule.find_in_range((start, end), &options);
        prop_assert!(found.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(found.iter().all(|t| *t >= start && *t <= end && rule.matches(*t)));
        if let Some(limit) = limit {
            prop_assert!(found.len() <= limit);
        }
    }
}
