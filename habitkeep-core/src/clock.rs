//! Source of "today" for rollover decisions.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Local, NaiveDate};

/// Supplies the current calendar date. Time of day is irrelevant to habits.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock. Clones share the same date, so a test can keep a
/// handle and move time forward under a running tracker.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().expect("clock lock poisoned") = date;
    }

    pub fn advance_days(&self, days: i64) {
        let mut date = self.date.lock().expect("clock lock poisoned");
        *date += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().expect("clock lock poisoned")
    }
}
