//! Raw rule configuration.
//!
//! [`RuleConfig`] mirrors the configuration map a caller supplies: every key
//! is optional at this stage, and list-valued keys also accept a single
//! scalar. Nothing is validated until [`RuleConfig::build`] (or
//! [`Rule::new`](crate::Rule::new)) runs the normalizer.
//!
//! ```
//! use recurrence_engine::RuleConfig;
//!
//! let config = RuleConfig::from_json(
//!     r#"{"unit": "years", "months": "feb", "weekdays": ["tuesday", "weds"]}"#,
//! )
//! .unwrap();
//! let rule = config.build().unwrap();
//! assert_eq!(rule.months(), vec![2]);
//! assert_eq!(rule.weekdays(), vec![2, 3]);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::rule::Rule;

/// A weekday, month or monthday entry: an index or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Index(i64),
    Name(String),
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token::Index(value)
    }
}

impl From<i32> for Token {
    fn from(value: i32) -> Self {
        Token::Index(i64::from(value))
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token::Index(i64::from(value))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Name(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Name(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Index(i) => write!(f, "{i}"),
            Token::Name(s) => f.write_str(s),
        }
    }
}

/// A scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

/// Unvalidated rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// One of `minutes`, `hours`, `days`, `weeks`, `months`, `years`.
    #[serde(default)]
    pub unit: Option<String>,
    /// Repeat every N units. Defaults to 1.
    #[serde(default)]
    pub frequency: Option<u32>,
    /// Reference instant for frequency phase and default sub-fields.
    #[serde(default)]
    pub anchor: Option<DateTime<Utc>>,
    /// Time-of-day tokens, e.g. `"5pm 4:45:12am"`.
    #[serde(default)]
    pub times: Option<String>,
    #[serde(default)]
    pub weekdays: Option<OneOrMany<Token>>,
    /// Nth (or nth-from-last, when negative) weekday of the month.
    #[serde(default)]
    pub weeks: Option<OneOrMany<i64>>,
    #[serde(default)]
    pub months: Option<OneOrMany<Token>>,
    #[serde(default)]
    pub monthdays: Option<OneOrMany<Token>>,
}

impl RuleConfig {
    pub fn new(unit: impl Into<String>) -> Self {
        RuleConfig {
            unit: Some(unit.into()),
            ..Default::default()
        }
    }

    /// Decode a configuration from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Malformed`] if the document is not a
    /// JSON object of the expected shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Malformed(e.to_string()))
    }

    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn times(mut self, times: impl Into<String>) -> Self {
        self.times = Some(times.into());
        self
    }

    pub fn weekday(mut self, weekday: impl Into<Token>) -> Self {
        self.weekdays = Some(OneOrMany::One(weekday.into()));
        self
    }

    pub fn weekdays<I, T>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.weekdays = Some(collect(weekdays));
        self
    }

    pub fn week(mut self, week: i64) -> Self {
        self.weeks = Some(OneOrMany::One(week));
        self
    }

    pub fn weeks<I: IntoIterator<Item = i64>>(mut self, weeks: I) -> Self {
        self.weeks = Some(OneOrMany::Many(weeks.into_iter().collect()));
        self
    }

    pub fn month(mut self, month: impl Into<Token>) -> Self {
        self.months = Some(OneOrMany::One(month.into()));
        self
    }

    pub fn months<I, T>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.months = Some(collect(months));
        self
    }

    pub fn monthday(mut self, monthday: impl Into<Token>) -> Self {
        self.monthdays = Some(OneOrMany::One(monthday.into()));
        self
    }

    pub fn monthdays<I, T>(mut self, monthdays: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.monthdays = Some(collect(monthdays));
        self
    }

    /// Validate and normalize into a [`Rule`].
    ///
    /// # Errors
    ///
    /// See [`Rule::new`].
    pub fn build(self) -> Result<Rule> {
        Rule::new(self)
    }
}

fn collect<I, T>(items: I) -> OneOrMany<Token>
where
    I: IntoIterator<Item = T>,
    T: Into<Token>,
{
    OneOrMany::Many(items.into_iter().map(Into::into).collect())
}
