//! Wall-clock access.
//!
//! The timer never counts ticks; every computation asks a [`Clock`] for the
//! current instant. Tests swap in a [`ManualClock`] to simulate gaps.

use std::cell::Cell;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

pub trait Clock {
    /// Current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for statistics.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// The real system clock. Calendar days are taken in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Calendar days are taken in UTC so results do not depend
/// on the machine's timezone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn today(&self) -> NaiveDate {
        self.now.get().date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
