//! Time-range filter: named predicates narrowing which positions count.

use crate::datasource::PositionFilter;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Source of "now" for relative ranges. Injected so range predicates stay
/// deterministic under test.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeRange {
    /// No predicate.
    #[default]
    AllTime,
    /// Positions settled within the last seven days of `now`.
    LastWeek,
}

impl TimeRange {
    pub const LAST_WEEK_DAYS: i64 = 7;

    /// Build the data source predicate for this range, evaluated at `now`.
    pub fn filter(&self, now: DateTime<Utc>) -> PositionFilter {
        match self {
            TimeRange::AllTime => PositionFilter::all(),
            TimeRange::LastWeek => {
                PositionFilter::since(now - Duration::days(Self::LAST_WEEK_DAYS))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::AllTime => "all",
            TimeRange::LastWeek => "week",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time range: {0} (expected all or week)")]
pub struct RangeParseError(pub String);

impl FromStr for TimeRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-time" => Ok(TimeRange::AllTime),
            "week" | "last-week" => Ok(TimeRange::LastWeek),
            _ => Err(RangeParseError(s.to_string())),
        }
    }
}
