//! Time-of-day token grammar.
//!
//! Input is a whitespace-separated list of tokens of the form
//! `H[:M[:S]][am|pm]`, e.g. `"4:30pm 5pm 3:30:30"`. Parsing is lenient:
//! tokens that do not fit the grammar are dropped, and the caller decides
//! what an empty result means.

use std::collections::BTreeSet;

use crate::rule::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse every recognizable token in `input`. Duplicates collapse.
pub fn parse_times(input: &str) -> BTreeSet<TimeOfDay> {
    input
        .split_whitespace()
        .filter_map(|token| {
            let parsed = parse_time_token(token);
            if parsed.is_none() {
                tracing::trace!(token, "dropping unparseable time token");
            }
            parsed
        })
        .collect()
}

/// Parse a single token: "2pm", "2:30pm", "14:00", "0:45:30", "12am".
pub fn parse_time_token(token: &str) -> Option<TimeOfDay> {
    let lower = token.trim().to_ascii_lowercase();
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some(Meridiem::Pm))
    } else if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some(Meridiem::Am))
    } else {
        (lower.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour = parse_field(parts.next()?)?;
    let minute = parts.next().map_or(Some(0), parse_field)?;
    let second = parts.next().map_or(Some(0), parse_field)?;
    if parts.next().is_some() {
        return None;
    }

    let hour24 = match (meridiem, hour) {
        (None, h) => h,
        (Some(_), h) if !(1..=12).contains(&h) => return None,
        (Some(Meridiem::Pm), 12) => 12,
        (Some(Meridiem::Am), 12) => 0,
        (Some(Meridiem::Pm), h) => h + 12,
        (Some(Meridiem::Am), h) => h,
    };

    TimeOfDay::new(hour24, minute, second)
}

/// One or two ASCII digits.
fn parse_field(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
