//! Reference points for resolving relative temporal expressions.
//!
//! Every way a caller can supply an anchor collapses into one [`AnchorPoint`].
//! Calendar fields are validated here, once, so an invalid date never reaches
//! a grammar engine.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

/// A calendar field combination that does not form a real date or time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i32 },
    #[error("month {month} is outside 1..=12")]
    MonthOutOfRange { month: u32 },
    #[error("day {day} does not exist in {year}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
    #[error("hour {hour} is outside 0..=23")]
    HourOutOfRange { hour: u32 },
    #[error("minute {minute} is outside 0..=59")]
    MinuteOutOfRange { minute: u32 },
    #[error("second {second} is outside 0..=59")]
    SecondOutOfRange { second: u32 },
}

/// Whether an anchor names a whole day or an instant within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Calendar day; time-of-day is start of day.
    Day,
    /// Date and time-of-day with second precision.
    Instant,
}

/// Canonical anchor: a validated date with optional time-of-day.
///
/// Date-only anchors start at 00:00:00. Sub-second precision is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorPoint {
    start: NaiveDateTime,
    granularity: Granularity,
}

impl AnchorPoint {
    /// Anchor on a calendar day.
    pub fn date(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        let date = validate_date(year, month, day)?;
        Ok(Self::from_date(date))
    }

    /// Anchor on a date and time-of-day (seconds = 0).
    pub fn date_time(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<Self, CalendarError> {
        Self::date_time_with_seconds(year, month, day, hour, minute, 0)
    }

    pub fn date_time_with_seconds(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, CalendarError> {
        let date = validate_date(year, month, day)?;
        let time = validate_time(hour, minute, second)?;
        Ok(Self {
            start: date.and_time(time),
            granularity: Granularity::Instant,
        })
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            start: date.and_time(NaiveTime::MIN),
            granularity: Granularity::Day,
        }
    }

    #[must_use]
    pub fn from_date_time(value: NaiveDateTime) -> Self {
        // Only sub-second precision is dropped; the fallback is unreachable for
        // values chrono already accepted.
        let start = value.with_nanosecond(0).unwrap_or(value);
        Self {
            start,
            granularity: Granularity::Instant,
        }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub fn date_part(&self) -> NaiveDate {
        self.start.date()
    }

    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.start.day()
    }
}

impl From<NaiveDate> for AnchorPoint {
    fn from(value: NaiveDate) -> Self {
        Self::from_date(value)
    }
}

impl From<NaiveDateTime> for AnchorPoint {
    fn from(value: NaiveDateTime) -> Self {
        Self::from_date_time(value)
    }
}

impl fmt::Display for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Day => write!(f, "{}", self.start.format("%Y-%m-%d")),
            Granularity::Instant => write!(f, "{}", self.start.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

fn validate_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::MonthOutOfRange { month });
    }
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(CalendarError::YearOutOfRange { year });
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(CalendarError::DayOutOfRange { year, month, day })
}

fn validate_time(hour: u32, minute: u32, second: u32) -> Result<NaiveTime, CalendarError> {
    if hour > 23 {
        return Err(CalendarError::HourOutOfRange { hour });
    }
    if minute > 59 {
        return Err(CalendarError::MinuteOutOfRange { minute });
    }
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or(CalendarError::SecondOutOfRange { second })
}
