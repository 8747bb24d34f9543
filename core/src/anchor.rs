//! Anchor resolution: every supported call shape becomes one [`AnchorPoint`].

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};

use timex_types::{AnchorPoint, CalendarError};

/// Source of "now" for calls without an explicit anchor.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// The ways a caller may name a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSpec {
    /// Current wall-clock time, captured when the call is made.
    Now,
    Date {
        year: i32,
        month: u32,
        day: u32,
    },
    DateTime {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
    Point(AnchorPoint),
}

impl From<AnchorPoint> for AnchorSpec {
    fn from(value: AnchorPoint) -> Self {
        AnchorSpec::Point(value)
    }
}

impl From<NaiveDate> for AnchorSpec {
    fn from(value: NaiveDate) -> Self {
        AnchorSpec::Point(AnchorPoint::from_date(value))
    }
}

impl From<NaiveDateTime> for AnchorSpec {
    fn from(value: NaiveDateTime) -> Self {
        AnchorSpec::Point(AnchorPoint::from_date_time(value))
    }
}

#[derive(Clone)]
pub struct AnchorResolver {
    clock: Arc<dyn Clock>,
}

impl AnchorResolver {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn resolve(&self, spec: AnchorSpec) -> Result<AnchorPoint, CalendarError> {
        match spec {
            AnchorSpec::Now => Ok(AnchorPoint::from_date_time(self.clock.now())),
            AnchorSpec::Date { year, month, day } => AnchorPoint::date(year, month, day),
            AnchorSpec::DateTime {
                year,
                month,
                day,
                hour,
                minute,
            } => AnchorPoint::date_time(year, month, day, hour, minute),
            AnchorSpec::Point(point) => Ok(point),
        }
    }
}

impl Default for AnchorResolver {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for AnchorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorResolver").finish_non_exhaustive()
    }
}
