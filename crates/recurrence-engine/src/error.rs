//! Error types for rule construction.
//!
//! Only construction can fail. Queries against a built [`Rule`](crate::Rule)
//! report exhaustion as `None` rather than as an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing unit")]
    MissingUnit,

    #[error("Invalid unit: '{0}'")]
    InvalidUnit(String),

    #[error("Invalid frequency: {0} (must be at least 1)")]
    InvalidFrequency(u32),

    #[error("Frequency {0} requires an anchor")]
    MissingAnchor(u32),

    #[error("Invalid weekday: '{0}'")]
    InvalidWeekday(String),

    #[error("Invalid month: '{0}'")]
    InvalidMonth(String),

    #[error("Invalid week: {0} (expected -5..=-1 or 1..=5)")]
    InvalidWeek(i64),

    #[error("Invalid monthday: '{0}'")]
    InvalidMonthday(String),

    #[error("Ambiguous weekly times: a weekly rule with times needs weekdays or an anchor")]
    AmbiguousWeeklyTimes,

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
