use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::progress::{DailyProgress, Increment};
use crate::error::{HabitError, HabitResult};

/// Stable identifier of a habit. Never derived from the name.
pub type HabitId = Uuid;

/// A recurring goal tracked per period.
///
/// Progress counts repetitions in the current period and always satisfies
/// `progress <= target` once an operation has completed. The period itself is
/// anchored at `last_reset_date`; see [`Habit::roll_over`] for how a new
/// period begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Repetitions required per period. At least 1.
    pub target: u32,
    pub frequency: Frequency,
    pub icon: IconTag,
    pub note: String,
    pub progress: u32,
    /// Day the current period started. `None` until the first rollover
    /// evaluation after a load without history.
    pub last_reset_date: Option<NaiveDate>,
    /// Dated snapshots, oldest first. At most one per date.
    pub history: Vec<DailyProgress>,
}

/// How often a habit's progress resets.
///
/// - `Daily`: every new calendar day
/// - `Every2Days`: once two calendar days have elapsed since the last reset
/// - `Weekly`: once seven calendar days have elapsed since the last reset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "every_2_days")]
    Every2Days,
    #[serde(rename = "weekly")]
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Every2Days => "every_2_days",
            Self::Weekly => "weekly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "every_2_days" | "every-2-days" => Some(Self::Every2Days),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Calendar days that must elapse after a reset before the next one.
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Every2Days => 2,
            Self::Weekly => 7,
        }
    }

    /// Whether a period anchored at `last` has ended by `today`.
    pub fn reset_due(&self, last: NaiveDate, today: NaiveDate) -> bool {
        (today - last).num_days() >= self.period_days()
    }
}

/// Symbolic icon shown next to a habit. Opaque to the tracking logic.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IconTag {
    #[default]
    Pills,
    Glass,
    Man,
    Music,
    Card,
}

impl IconTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pills => "pills",
            Self::Glass => "glass",
            Self::Man => "man",
            Self::Music => "music",
            Self::Card => "card",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pills" => Some(Self::Pills),
            "glass" => Some(Self::Glass),
            "man" => Some(Self::Man),
            "music" => Some(Self::Music),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

/// Input for creating a new habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitInput {
    pub name: String,
    pub target: u32,
    pub frequency: Frequency,
    #[serde(default)]
    pub icon: IconTag,
    #[serde(default)]
    pub note: String,
}

/// Input for editing a habit. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHabitInput {
    pub name: Option<String>,
    pub target: Option<u32>,
    pub frequency: Option<Frequency>,
    pub icon: Option<IconTag>,
    pub note: Option<String>,
}

impl Habit {
    /// Builds a new habit with a fresh identifier and zero progress.
    pub fn new(input: CreateHabitInput, today: NaiveDate) -> HabitResult<Self> {
        let name = validate_name(&input.name)?;
        validate_target(input.target)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            target: input.target,
            frequency: input.frequency,
            icon: input.icon,
            note: input.note,
            progress: 0,
            last_reset_date: Some(today),
            history: Vec::new(),
        })
    }

    /// Replaces the provided fields in place. Identifier, progress and history
    /// are kept; nothing changes when validation fails.
    pub fn apply_update(&mut self, input: UpdateHabitInput) -> HabitResult<()> {
        let name = input.name.as_deref().map(validate_name).transpose()?;
        if let Some(target) = input.target {
            validate_target(target)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(target) = input.target {
            self.target = target;
        }
        if let Some(frequency) = input.frequency {
            self.frequency = frequency;
        }
        if let Some(icon) = input.icon {
            self.icon = icon;
        }
        if let Some(note) = input.note {
            self.note = note;
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }

    /// Adds one repetition unless the period target is already reached, and
    /// records the new value as today's snapshot.
    pub fn increment(&mut self, today: NaiveDate) -> Increment {
        if self.progress >= self.target {
            return Increment {
                progress: self.progress,
                target: self.target,
                incremented: false,
            };
        }

        self.progress += 1;
        self.record_progress(today);
        Increment {
            progress: self.progress,
            target: self.target,
            incremented: true,
        }
    }

    /// Writes the current progress as the snapshot for `date`, replacing an
    /// existing snapshot for that date. Returns the snapshot when history
    /// actually changed.
    pub fn record_progress(&mut self, date: NaiveDate) -> Option<DailyProgress> {
        let snapshot = DailyProgress {
            date,
            progress: self.progress,
            target: self.target,
        };

        match self.history.iter_mut().rev().find(|r| r.date == date) {
            Some(existing) if *existing == snapshot => None,
            Some(existing) => {
                *existing = snapshot;
                Some(snapshot)
            }
            None => {
                self.history.push(snapshot);
                Some(snapshot)
            }
        }
    }

    /// The latest snapshot recorded for `date`.
    pub fn progress_on(&self, date: NaiveDate) -> Option<&DailyProgress> {
        self.history.iter().rev().find(|r| r.date == date)
    }

    /// Completion ratio recorded for `date`, or 0 when nothing was recorded.
    pub fn fraction_on(&self, date: NaiveDate) -> f32 {
        self.progress_on(date).map_or(0.0, DailyProgress::fraction)
    }

    /// Seven daily ratios starting at `week_start`.
    pub fn weekly_fractions(&self, week_start: NaiveDate) -> [f32; 7] {
        let mut days = [0.0; 7];
        for (offset, slot) in days.iter_mut().enumerate() {
            *slot = self.fraction_on(week_start + Duration::days(offset as i64));
        }
        days
    }
}

/// The Monday on or before `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn validate_name(name: &str) -> HabitResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::InvalidArgument(
            "habit name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_target(target: u32) -> HabitResult<()> {
    if target < 1 {
        return Err(HabitError::InvalidArgument(format!(
            "target must be at least 1, got {target}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn week_start_is_monday() {
        // 2026-10-19 is a Monday
        assert_eq!(week_start_of(date(2026, 10, 19)), date(2026, 10, 19));
        assert_eq!(week_start_of(date(2026, 10, 25)), date(2026, 10, 19));
        assert_eq!(week_start_of(date(2026, 10, 26)), date(2026, 10, 26));
    }

    #[test]
    fn frequency_parses_both_spellings() {
        assert_eq!(Frequency::from_str("every-2-days"), Some(Frequency::Every2Days));
        assert_eq!(Frequency::from_str("every_2_days"), Some(Frequency::Every2Days));
        assert_eq!(Frequency::from_str("monthly"), None);
    }

    #[test]
    fn reset_due_counts_elapsed_days() {
        let d = date(2026, 10, 1);
        assert!(Frequency::Daily.reset_due(d, date(2026, 10, 2)));
        assert!(!Frequency::Every2Days.reset_due(d, date(2026, 10, 2)));
        assert!(Frequency::Every2Days.reset_due(d, date(2026, 10, 3)));
        assert!(!Frequency::Weekly.reset_due(d, date(2026, 10, 7)));
        assert!(Frequency::Weekly.reset_due(d, date(2026, 10, 8)));
    }

    #[test]
    fn record_progress_replaces_same_day_snapshot() {
        let today = date(2026, 10, 19);
        let mut habit = Habit::new(
            CreateHabitInput {
                name: "Water".to_string(),
                target: 3,
                frequency: Frequency::Daily,
                icon: IconTag::Glass,
                note: String::new(),
            },
            today,
        )
        .expect("valid habit");

        habit.increment(today);
        habit.increment(today);

        assert_eq!(habit.history.len(), 1);
        assert_eq!(habit.history[0].progress, 2);
        assert!(habit.record_progress(today).is_none());
    }
}
