//! Clock

use std::fmt::Debug;

use jiff::{Timestamp, civil::Date, tz::TimeZone};

/// Source of the current instant and the business date discounts are evaluated on.
pub trait Clock: Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;

    /// Current date in the store's time zone.
    fn today(&self) -> Date;
}

/// Wall clock in a fixed time zone.
#[derive(Debug, Clone)]
pub struct SystemClock {
    time_zone: TimeZone,
}

impl SystemClock {
    #[must_use]
    pub fn new(time_zone: TimeZone) -> Self {
        Self { time_zone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TimeZone::system())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn today(&self) -> Date {
        self.now().to_zoned(self.time_zone.clone()).date()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: Timestamp,
    today: Date,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: Timestamp, today: Date) -> Self {
        Self { now, today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn today(&self) -> Date {
        self.today
    }
}
