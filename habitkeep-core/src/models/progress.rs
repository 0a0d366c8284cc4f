use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Progress reached on one calendar day.
///
/// The target is frozen at the time the snapshot is taken, so later edits to
/// the habit never change how a past day is scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub progress: u32,
    pub target: u32,
}

impl DailyProgress {
    /// Completion ratio in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            return 0.0;
        }
        (self.progress as f32 / self.target as f32).min(1.0)
    }
}

/// Result of an increment request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Increment {
    pub progress: u32,
    pub target: u32,
    /// `false` when the habit was already complete for the period.
    pub incremented: bool,
}

/// What a rollover evaluation did to a habit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    /// `last_reset_date` was unset and has been initialized to today.
    pub initialized: bool,
    /// Progress exceeded the target and was clamped down to it.
    pub clamped: bool,
    /// History record written before the period check. `None` when history
    /// already held the same snapshot.
    pub archived: Option<DailyProgress>,
    /// Progress was zeroed and a new period started today.
    pub reset: bool,
}

impl Rollover {
    pub fn is_noop(&self) -> bool {
        !self.initialized && !self.clamped && self.archived.is_none() && !self.reset
    }
}
