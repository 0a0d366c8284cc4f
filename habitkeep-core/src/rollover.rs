//! Period rollover.
//!
//! Rollover is evaluated lazily, whenever a habit is loaded or edited, never on
//! a timer. A gap of several days is reconciled in a single step the next time
//! the habit is touched: the elapsed days decide whether a reset is due, missed
//! periods are not replayed one by one.

use chrono::NaiveDate;

use crate::models::{DailyProgress, Habit, Rollover};

impl Habit {
    /// Brings the habit's period up to date with `today`.
    ///
    /// 1. Progress above the target (after a downward edit) is clamped.
    /// 2. With no `last_reset_date`, the period starts today.
    /// 3. When the calendar moved past `last_reset_date`, non-zero progress is
    ///    archived under the day it was accrued unless that day already has a
    ///    record, then the frequency decides
    ///    whether the period is over. A due period zeroes progress and starts
    ///    again today; otherwise the period simply continues.
    ///
    /// A clock that moved backwards leaves the habit untouched.
    pub fn roll_over(&mut self, today: NaiveDate) -> Rollover {
        let mut outcome = Rollover::default();

        if self.progress > self.target {
            self.progress = self.target;
            outcome.clamped = true;
        }

        let Some(last) = self.last_reset_date else {
            self.last_reset_date = Some(today);
            outcome.initialized = true;
            return outcome;
        };

        if today <= last {
            return outcome;
        }

        if self.progress > 0 {
            let accrued_on = self.accrual_date(last, today);
            outcome.archived = self.archive(accrued_on);
        }

        if self.frequency.reset_due(last, today) {
            self.progress = 0;
            self.last_reset_date = Some(today);
            outcome.reset = true;
        }

        outcome
    }

    /// Appends a snapshot for `date` when none exists. Existing records are
    /// frozen with the target they were taken under.
    fn archive(&mut self, date: NaiveDate) -> Option<DailyProgress> {
        if self.progress_on(date).is_some() {
            return None;
        }
        let snapshot = DailyProgress {
            date,
            progress: self.progress,
            target: self.target,
        };
        self.history.push(snapshot);
        Some(snapshot)
    }

    /// Latest day in `last..today` that has a snapshot, else `last`.
    fn accrual_date(&self, last: NaiveDate, today: NaiveDate) -> NaiveDate {
        self.history
            .iter()
            .map(|r| r.date)
            .filter(|d| *d >= last && *d < today)
            .max()
            .unwrap_or(last)
    }
}
