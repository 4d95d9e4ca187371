//! # recurrence-engine
//!
//! Calendar-based recurrence rules over a single UTC timeline.
//!
//! A [`Rule`] describes a repeating pattern ("every other week on Saturday
//! and Sunday at noon", "the last Monday of every month") built from a unit,
//! a frequency, an optional anchor and a handful of calendar filters. Given a
//! rule, the engine answers three questions: does an instant match, what is
//! the nearest match before or after an instant, and which matches fall in a
//! bounded interval.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use recurrence_engine::RuleConfig;
//!
//! let rule = RuleConfig::new("months")
//!     .week(-1)
//!     .weekday("monday")
//!     .times("9:30am")
//!     .build()
//!     .unwrap();
//!
//! let next = rule.find_next(Utc.with_ymd_and_hms(2006, 12, 1, 0, 0, 0).unwrap());
//! assert_eq!(next, Some(Utc.with_ymd_and_hms(2006, 12, 25, 9, 30, 0).unwrap()));
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Unvalidated rule configuration and its builder
//! - [`normalize`]: Validation and canonicalization into a [`Rule`]
//! - [`rule`]: The immutable rule value and its query methods
//! - [`times`]: Time-of-day token grammar
//! - [`calendar`]: Week numbering, month lengths, nth-weekday arithmetic
//! - [`matcher`]: Instant membership test
//! - [`navigator`]: Nearest match forward or backward
//! - [`range`]: Bounded, optionally limited enumeration
//! - [`error`]: Error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod matcher;
pub mod navigator;
pub mod normalize;
pub mod range;
pub mod rule;
pub mod times;

pub use calendar::{
    absolute_week, day_of_week, days_in_month, nth_weekday_of_month, week_of_year, week_start,
    weekday_ordinal,
};
pub use config::{OneOrMany, RuleConfig, Token};
pub use error::ConfigurationError;
pub use matcher::matches;
pub use navigator::{find_next, find_previous, MAX_ITERATIONS};
pub use normalize::normalize;
pub use range::{find_in_range, FindOptions, Interval, IntervalSource, Occurrences};
pub use rule::{Rule, TimeOfDay, Unit};
pub use times::{parse_time_token, parse_times};
