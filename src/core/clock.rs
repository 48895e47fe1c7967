//! Calendar date source for "today"

use chrono::{Duration, FixedOffset, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn yesterday(&self) -> NaiveDate {
        self.today() - Duration::days(1)
    }
}

/// Current date at a fixed UTC offset. Guatemala stays on -06:00 all year.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    pub fn new(offset: FixedOffset) -> Self {
        LocalClock { offset }
    }

    /// Builds a clock from whole hours east of UTC, `None` when out of range.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        LocalClock {
            offset: FixedOffset::west_opt(6 * 3600).expect("valid offset"),
        }
    }
}

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Always reports the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
